//! Benchmarks for reading-order reconstruction and PDF text extraction.
//!
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use readaloud::{ColumnLayout, ColumnReconstructor, NarrateOptions, PositionedFragment};

/// Fragments scattered over a two-column page, in scrambled order.
fn scattered_fragments(count: usize) -> Vec<PositionedFragment> {
    (0..count)
        .map(|i| {
            let x = ((i * 7919) % 1000) as f32;
            let y = ((i * 104_729) % 1400) as f32;
            PositionedFragment::new(format!("word{}", i), x, y)
        })
        .collect()
}

/// Creates a minimal synthetic PDF with the given number of two-column pages.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut content = String::new();
    content.push_str("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 3)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 1000 1400] >>\nendobj\n",
        kids.join(" "),
        page_count
    ));

    let mut next_obj = 3;
    for i in 0..page_count {
        let page_obj = next_obj;
        let content_obj = next_obj + 1;
        next_obj += 2;

        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));

        let mut text = String::new();
        for line in 0..20 {
            let y = 1300 - line * 30;
            text.push_str(&format!(
                "BT /F1 12 Tf 560 {} Td (Page {} right column line {}) Tj ET\n",
                y,
                i + 1,
                line
            ));
            text.push_str(&format!(
                "BT /F1 12 Tf 60 {} Td (Page {} left column line {}) Tj ET\n",
                y,
                i + 1,
                line
            ));
        }
        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    // lopdf rebuilds the xref when offsets are wrong
    let xref_offset = content.len();
    content.push_str(&format!("xref\n0 {}\n", next_obj));
    content.push_str("0000000000 65535 f \n");
    for _ in 1..next_obj {
        content.push_str("0000000000 00000 n \n");
    }
    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        next_obj, xref_offset
    ));

    content.into_bytes()
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");

    for count in [10, 100, 1000] {
        let fragments = scattered_fragments(count);
        let reconstructor = ColumnReconstructor::default();

        group.bench_function(format!("{}_fragments", count), |b| {
            b.iter(|| reconstructor.reconstruct(black_box(&fragments), 1000.0));
        });
    }

    let fragments = scattered_fragments(1000);
    let single = ColumnReconstructor::new(Arc::new(ColumnLayout::single_column()));
    group.bench_function("1000_fragments_single_column", |b| {
        b.iter(|| single.reconstruct(black_box(&fragments), 1000.0));
    });

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for page_count in [1, 10] {
        let data = create_test_pdf(page_count);
        for (label, options) in [
            ("parallel", NarrateOptions::default()),
            ("sequential", NarrateOptions::default().sequential()),
        ] {
            group.bench_function(format!("{}_pages_{}", page_count, label), |b| {
                b.iter(|| {
                    // The synthetic xref is rebuilt by lopdf on load.
                    let _ = readaloud::extract_bytes(black_box(&data), &options);
                });
            });
        }
    }

    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("sniff_valid_pdf", |b| {
        b.iter(|| readaloud::sniff_pdf(black_box(&pdf_data)).is_ok());
    });

    c.bench_function("sniff_non_pdf", |b| {
        b.iter(|| readaloud::sniff_pdf(black_box(non_pdf_data)).is_err());
    });
}

criterion_group!(benches, bench_reconstruct, bench_extraction, bench_detection);
criterion_main!(benches);
