//! # readaloud
//!
//! Turn PDF documents into narrated audio.
//!
//! Each page's embedded text is put back into human reading order, with
//! multi-column pages read column by column (right column first for
//! bidirectional Hebrew/English layouts). Pages without usable text are
//! rasterized and sent through OCR, and the recognized text goes through the
//! same column reconstruction. The assembled document is matched to a
//! supported locale and streamed through a neural text-to-speech voice.
//!
//! ## Quick Start
//!
//! ```no_run
//! use readaloud::{extract_file, NarrateOptions};
//!
//! fn main() -> readaloud::Result<()> {
//!     let document = extract_file("paper.pdf", &NarrateOptions::default())?;
//!     println!("{}", document.as_str());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Column-aware reading order**: pluggable [`ReadingOrderPolicy`]
//! - **OCR fallback**: injected engine, lazy initialization, locale degradation
//! - **Streaming synthesis**: audio pulled chunk by chunk from a [`SpeechService`]
//! - **Parallel processing**: pages extracted with Rayon
//! - `async`: `edge-tts` speech backend on Tokio
//! - `lingua`: statistical language detection

pub mod convert;
pub mod detect;
pub mod error;
pub mod language;
pub mod layout;
pub mod model;
pub mod ocr;
pub mod options;
pub mod source;
pub mod speech;

// Re-export commonly used types
pub use convert::{suggested_filename, DocumentAssembler, Narration, Narrator, TextExtractor};
pub use detect::{is_pdf_bytes, sniff_pdf, PdfHeader};
pub use error::{Error, Result};
pub use language::{LanguageDetector, LanguageResolution, LanguageResolver};
pub use layout::{ColumnDirection, ColumnLayout, ColumnReconstructor, ReadingOrderPolicy};
pub use model::{
    AudioBuffer, BoundingBox, ChunkKind, DocumentText, ExtractionStats, Gender, Locale, Page,
    PageText, PositionedFragment, SpeechChunk, SpeechRate, TextOrigin, VoiceProfile,
};
pub use ocr::{OcrEngine, OcrFallback, OcrLoader, OcrResult, OcrService, OcrStatus};
pub use options::{NarrateOptions, PageSelection, ReadingOrder};
pub use source::{DocumentSource, LopdfSource, PageRasterizer, PdftoppmRasterizer, RasterImage};
pub use speech::{SpeechRequest, SpeechService, VoiceSynthesizer};

#[cfg(feature = "async")]
pub use speech::EdgeTtsCommand;

#[cfg(feature = "lingua")]
pub use language::LinguaDetector;

use std::path::Path;

/// Reading-order text of a PDF file, without OCR.
pub fn extract_file<P: AsRef<Path>>(path: P, options: &NarrateOptions) -> Result<DocumentText> {
    let source = LopdfSource::open(path)?;
    extract_source(&source, options)
}

/// Reading-order text of an in-memory PDF, without OCR.
pub fn extract_bytes(data: &[u8], options: &NarrateOptions) -> Result<DocumentText> {
    let source = LopdfSource::from_bytes(data.to_vec())?;
    extract_source(&source, options)
}

/// Reading-order text of any source, without OCR.
pub fn extract_source(source: &dyn DocumentSource, options: &NarrateOptions) -> Result<DocumentText> {
    TextExtractor::from_options(options).extract(source)
}

/// Extract reading-order text asynchronously.
///
/// Runs extraction on a blocking thread.
#[cfg(feature = "async")]
pub async fn extract_file_async<P: AsRef<Path>>(
    path: P,
    options: NarrateOptions,
) -> Result<DocumentText> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || extract_file(path, &options))
        .await
        .map_err(|e| Error::Other(e.to_string()))?
}
