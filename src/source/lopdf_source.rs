//! PDF document source backed by lopdf.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};
use unicode_normalization::UnicodeNormalization;

use crate::detect::sniff_pdf;
use crate::error::{Error, Result};
use crate::model::{Page, PositionedFragment};

use super::backend::{DocumentSource, PageRasterizer, RasterImage};

/// US Letter, used when a page declares no usable MediaBox.
const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Share of the font size above the baseline.
const ASCENT: f32 = 0.8;

/// TJ adjustments beyond this (thousandths of an em) read as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Page tree inheritance is never legitimately this deep.
const MAX_INHERIT_DEPTH: usize = 32;

/// A PDF held in memory, exposing embedded text with positions.
pub struct LopdfSource {
    doc: LopdfDocument,
    data: Arc<Vec<u8>>,
    pages: BTreeMap<u32, ObjectId>,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Load from an in-memory byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let header = sniff_pdf(&data)?;
        log::debug!("Loading {} ({} bytes)", header, data.len());

        let doc = LopdfDocument::load_mem(&data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages();
        Ok(Self {
            doc,
            data: Arc::new(data),
            pages,
            rasterizer: None,
        })
    }

    /// Load from a reader.
    pub fn from_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Use `rasterizer` to render pages for OCR.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Raw PDF bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn page_id(&self, number: u32) -> Result<ObjectId> {
        self.pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, self.pages.len() as u32))
    }

    /// MediaBox as `[x0, y0, x1, y1]`, following the page tree upwards.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let mut current = match self.doc.get_dictionary(page_id) {
            Ok(dict) => dict,
            Err(_) => return LETTER,
        };

        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(obj) = current.get(b"MediaBox") {
                return self.rect_from_object(obj).unwrap_or(LETTER);
            }
            let parent = match current.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => parent,
                Err(_) => break,
            };
            current = match self.doc.get_dictionary(parent) {
                Ok(dict) => dict,
                Err(_) => break,
            };
        }
        LETTER
    }

    fn rect_from_object(&self, obj: &Object) -> Option<[f32; 4]> {
        let obj = match obj {
            Object::Reference(r) => self.doc.get_object(*r).ok()?,
            other => other,
        };
        let values: Vec<f32> = obj.as_array().ok()?.iter().filter_map(get_number).collect();
        match values.as_slice() {
            [a, b, c, d] => Some([a.min(*c), b.min(*d), a.max(*c), b.max(*d)]),
            _ => None,
        }
    }

    /// Decompressed content stream of a page; empty when it has none.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => stream_bytes(s),
                Object::Array(arr) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Ok(r) = obj.as_reference() {
                if let Ok(Object::Stream(s)) = self.doc.get_object(r) {
                    match stream_bytes(s) {
                        Ok(data) => {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                        Err(e) => log::warn!("Skipping undecodable content stream {:?}: {}", r, e),
                    }
                }
            }
        }
        content
    }
}

/// Raw bytes of a content stream, decoded only when it declares a filter.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    Ok(stream.decompressed_content()?)
}

impl DocumentSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<Page> {
        let page_id = self.page_id(number)?;
        let [x0, y0, x1, y1] = self.media_box(page_id);
        let mut page = Page::new(number, x1 - x0, y1 - y0);

        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(page);
        }
        let fonts = self.doc.get_page_fonts(page_id)?;
        let runs = TextRunCollector::new(&self.doc, &fonts).collect(&content)?;

        for run in runs {
            let text: String = run.text.nfc().collect();
            let x = run.x - x0;
            let y = y1 - (run.baseline + run.font_size * ASCENT);
            page.push(PositionedFragment::new(text, x, y));
        }
        log::debug!("Page {}: {} text fragments", number, page.fragments.len());
        Ok(page)
    }

    fn rasterize(&self, number: u32) -> Result<RasterImage> {
        self.page_id(number)?;
        match &self.rasterizer {
            Some(rasterizer) => rasterizer.rasterize(&self.data, number),
            None => Err(Error::Rasterize("no rasterizer configured".to_string())),
        }
    }
}

/// A shown string with its baseline origin in PDF user space.
#[derive(Debug, Clone)]
struct TextRun {
    text: String,
    x: f32,
    baseline: f32,
    font_size: f32,
}

/// Walks a content stream and records every text-showing operator.
struct TextRunCollector<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    font: Option<&'a Dictionary>,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
    runs: Vec<TextRun>,
}

impl<'a> TextRunCollector<'a> {
    fn new(doc: &'a LopdfDocument, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            font: None,
            font_size: 12.0,
            leading: 0.0,
            matrix: TextMatrix::default(),
            in_text: false,
            runs: Vec::new(),
        }
    }

    fn collect(mut self, content: &[u8]) -> Result<Vec<TextRun>> {
        let content = lopdf::content::Content::decode(content)?;

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "BT" => {
                    self.in_text = true;
                    self.matrix = TextMatrix::default();
                }
                "ET" => self.in_text = false,
                "Tf" => {
                    if let [Object::Name(name), size, ..] = operands {
                        self.font = self.fonts.get(name.as_slice()).copied();
                        self.font_size = get_number(size).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        self.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands {
                        let tx = get_number(tx).unwrap_or(0.0);
                        let ty = get_number(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            self.leading = -ty;
                        }
                        self.matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if operands.len() >= 6 {
                        let v: Vec<f32> = operands[..6]
                            .iter()
                            .map(|o| get_number(o).unwrap_or(0.0))
                            .collect();
                        self.matrix.set(v[0], v[1], v[2], v[3], v[4], v[5]);
                    }
                }
                "T*" => self.matrix.next_line(self.leading_or_default()),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(bytes);
                        self.push(text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = self.decode_array(items);
                        self.push(text);
                    }
                }
                "'" | "\"" => {
                    self.matrix.next_line(self.leading_or_default());
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(index) {
                        let text = self.decode(bytes);
                        self.push(text);
                    }
                }
                _ => {}
            }
        }

        Ok(self.runs)
    }

    fn leading_or_default(&self) -> f32 {
        if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self.font.and_then(|f| f.get_font_encoding(self.doc).ok());
        match &encoding {
            Some(enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Decode a TJ array, turning wide negative kerning into word spaces.
    fn decode_array(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    let adjustment = -get_number(other).unwrap_or(0.0);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with([' ', '\u{00A0}'])
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn push(&mut self, text: String) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let (x, baseline) = self.matrix.position();
        self.runs.push(TextRun {
            text,
            x,
            baseline,
            font_size: self.font_size * self.matrix.scale(),
        });
    }
}

/// Text matrix tracking for Td/TD/Tm/T* positioning.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    // Start of the current line; Td offsets are relative to it.
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decoding fallback when no font encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a PDF whose pages each carry the given content stream.
    fn build_pdf(media_box: [i32; 4], contents: &[&str]) -> Vec<u8> {
        use lopdf::dictionary;

        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for content in contents {
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => media_box.iter().map(|v| Object::Integer(*v as i64)).collect::<Vec<_>>(),
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
    fn test_rejects_non_pdf() {
        let result = LopdfSource::from_bytes(b"definitely not a pdf".to_vec());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_page_geometry_inherited() {
        let pdf = build_pdf([0, 0, 1000, 800], &["BT /F1 10 Tf 50 700 Td (Hi) Tj ET"]);
        let source = LopdfSource::from_bytes(pdf).unwrap();
        assert_eq!(source.page_count(), 1);

        let page = source.page(1).unwrap();
        assert_eq!(page.width, 1000.0);
        assert_eq!(page.height, 800.0);
    }

    #[test]
    fn test_fragments_use_top_left_coordinates() {
        let pdf = build_pdf(
            [0, 0, 1000, 800],
            &["BT /F1 10 Tf 600 700 Td (right) Tj ET BT /F1 10 Tf 50 600 Td (left) Tj ET"],
        );
        let source = LopdfSource::from_bytes(pdf).unwrap();
        let page = source.page(1).unwrap();

        assert_eq!(page.fragments.len(), 2);
        let right = &page.fragments[0];
        assert_eq!(right.text, "right");
        assert_eq!(right.x, 600.0);
        // 800 - (700 + 10 * 0.8)
        assert!((right.y - 92.0).abs() < 1e-3);

        let left = &page.fragments[1];
        assert_eq!(left.text, "left");
        assert!(left.y > right.y);
    }

    #[test]
    fn test_blank_page_has_no_fragments() {
        let pdf = build_pdf([0, 0, 612, 792], &["0 0 m 100 100 l S"]);
        let source = LopdfSource::from_bytes(pdf).unwrap();
        let page = source.page(1).unwrap();
        assert!(page.is_empty());
    }

    /// One page whose `Contents` is an array of streams, optionally deflated.
    fn build_split_content_pdf(parts: &[&str], compress: bool) -> Vec<u8> {
        use lopdf::dictionary;

        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut streams = Vec::new();
        for part in parts {
            let mut stream = Stream::new(dictionary! {}, part.as_bytes().to_vec());
            if compress {
                stream.compress().unwrap();
                assert!(stream.dict.get(b"Filter").is_ok());
            }
            streams.push(Object::Reference(doc.add_object(stream)));
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => streams,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(600), Object::Integer(800)],
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
    fn test_unfiltered_stream_is_used_verbatim() {
        let stream = Stream::new(Dictionary::new(), b"BT (raw) Tj ET".to_vec());
        assert_eq!(stream_bytes(&stream).unwrap(), b"BT (raw) Tj ET");
    }

    #[test]
    fn test_split_content_streams_are_joined() {
        let pdf = build_split_content_pdf(
            &[
                "BT /F1 10 Tf 50 700 Td (first) Tj ET",
                "BT /F1 10 Tf 50 600 Td (second) Tj ET",
            ],
            false,
        );
        let source = LopdfSource::from_bytes(pdf).unwrap();
        let page = source.page(1).unwrap();
        let texts: Vec<_> = page.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_deflated_content_stream() {
        let content = "BT /F1 10 Tf 50 700 Td (again) Tj ET ".repeat(20);
        let pdf = build_split_content_pdf(&[content.as_str()], true);
        let source = LopdfSource::from_bytes(pdf).unwrap();
        let page = source.page(1).unwrap();
        assert_eq!(page.fragments.len(), 20);
        assert!(page.fragments.iter().all(|f| f.text == "again"));
    }

    #[test]
    fn test_page_out_of_range() {
        let pdf = build_pdf([0, 0, 612, 792], &["BT /F1 12 Tf 10 10 Td (x) Tj ET"]);
        let source = LopdfSource::from_bytes(pdf).unwrap();
        assert!(matches!(source.page(5), Err(Error::PageOutOfRange(5, 1))));
    }

    #[test]
    fn test_rasterize_without_rasterizer() {
        let pdf = build_pdf([0, 0, 612, 792], &[""]);
        let source = LopdfSource::from_bytes(pdf).unwrap();
        assert!(matches!(source.rasterize(1), Err(Error::Rasterize(_))));
    }

    #[test]
    fn test_text_matrix_next_line() {
        let mut m = TextMatrix::default();
        m.translate(72.0, 700.0);
        m.next_line(14.0);
        assert_eq!(m.position(), (72.0, 686.0));
        m.set(2.0, 0.0, 0.0, 2.0, 10.0, 20.0);
        assert_eq!(m.scale(), 2.0);
        assert_eq!(m.position(), (10.0, 20.0));
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(
            decode_text_simple(&[0xFE, 0xFF, 0x05, 0xE9, 0x05, 0xDC]),
            "של"
        );
    }
}
