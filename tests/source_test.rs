//! Integration tests for PDF extraction through lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use readaloud::{extract_bytes, DocumentSource, LopdfSource, NarrateOptions, ReadingOrder};

/// Build a one-page PDF with text shown at each `(x, baseline, text)`.
fn two_column_pdf(runs: &[(i64, i64, &str)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (x, y, text) in runs {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]));
        operations.push(Operation::new("Td", vec![Object::Integer(*x), Object::Integer(*y)]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
        "Contents" => content_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(1000), Object::Integer(800)],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

#[test]
fn test_two_column_page_reads_right_first() {
    let pdf = two_column_pdf(&[
        (60, 700, "left top"),
        (60, 650, "left bottom"),
        (560, 690, "right top"),
        (560, 640, "right bottom"),
    ]);

    let document = extract_bytes(&pdf, &NarrateOptions::default()).unwrap();
    assert_eq!(
        document.text,
        "right top right bottom left top left bottom"
    );
}

#[test]
fn test_left_to_right_option() {
    let pdf = two_column_pdf(&[(560, 700, "second"), (60, 700, "first")]);
    let options = NarrateOptions::default().with_reading_order(ReadingOrder::LeftToRight);
    let document = extract_bytes(&pdf, &options).unwrap();
    assert_eq!(document.text, "first second");
}

#[test]
fn test_source_reports_geometry() {
    let pdf = two_column_pdf(&[(60, 700, "text")]);
    let source = LopdfSource::from_bytes(pdf).unwrap();
    assert_eq!(source.page_count(), 1);

    let page = source.page(1).unwrap();
    assert_eq!(page.width, 1000.0);
    assert_eq!(page.fragments.len(), 1);
    assert_eq!(page.fragments[0].x, 60.0);
}

#[test]
fn test_open_from_file() {
    let pdf = two_column_pdf(&[(60, 700, "from disk")]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, &pdf).unwrap();

    let document = readaloud::extract_file(file.path(), &NarrateOptions::default()).unwrap();
    assert_eq!(document.text, "from disk");
}
