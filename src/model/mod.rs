//! Data model shared by every pipeline stage.
//!
//! Fragments and pages are produced per request and dropped once a page has
//! been reconstructed; the voice table is static.

mod audio;
mod document;
mod fragment;
mod page;
mod voice;

pub use audio::{AudioBuffer, ChunkKind, SpeechChunk};
pub use document::{DocumentText, ExtractionStats};
pub(crate) use document::char_prefix;
pub use fragment::{BoundingBox, PositionedFragment};
pub use page::{Page, PageText, TextOrigin};
pub use voice::{Gender, Locale, SpeechRate, VoiceProfile};
