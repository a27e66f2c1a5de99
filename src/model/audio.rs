//! Speech chunks and the audio accumulator.

use serde::{Deserialize, Serialize};

/// Kind tag carried by every chunk a speech service yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Encoded audio payload
    Audio,
    /// Word-boundary timing marker
    WordBoundary,
    /// Sentence-boundary timing marker
    SentenceBoundary,
    /// Any other metadata the service emits
    Other(String),
}

/// One item of a streaming synthesis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechChunk {
    /// What the payload is
    pub kind: ChunkKind,
    /// Raw payload bytes
    pub data: Vec<u8>,
}

impl SpeechChunk {
    /// An audio payload chunk.
    pub fn audio(data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ChunkKind::Audio,
            data: data.into(),
        }
    }

    /// A metadata chunk of the given kind.
    pub fn metadata(kind: ChunkKind, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Check if the chunk carries audio.
    pub fn is_audio(&self) -> bool {
        self.kind == ChunkKind::Audio
    }
}

/// Append-only byte accumulator for one synthesis call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioBuffer {
    bytes: Vec<u8>,
}

impl AudioBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes at the end.
    pub fn append(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    /// Number of bytes accumulated.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hand the bytes over to the caller.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for AudioBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
