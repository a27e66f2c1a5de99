//! Streaming text-to-speech.
//!
//! A [`SpeechService`] produces a stream of tagged chunks that the
//! [`VoiceSynthesizer`] pulls and accumulates. Nothing is pushed at the
//! consumer: dropping the future stops the session.

mod synthesizer;

#[cfg(feature = "async")]
mod edge_tts;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{SpeechChunk, SpeechRate, VoiceProfile};

pub use synthesizer::VoiceSynthesizer;

#[cfg(feature = "async")]
pub use edge_tts::{EdgeTtsCommand, DEFAULT_EDGE_TTS};

/// Everything a speech service needs for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Voice to speak it with
    pub voice: VoiceProfile,
    /// Speaking-rate adjustment, passed through unchanged
    pub rate: SpeechRate,
}

impl SpeechRequest {
    /// Create a request.
    pub fn new(text: impl Into<String>, voice: VoiceProfile, rate: SpeechRate) -> Self {
        Self {
            text: text.into(),
            voice,
            rate,
        }
    }

    /// Service-level voice identifier.
    pub fn voice_id(&self) -> &'static str {
        self.voice.voice_id()
    }
}

/// An external speech synthesizer.
pub trait SpeechService: Send + Sync {
    /// Open a synthesis session.
    ///
    /// The stream yields audio and metadata chunks in the order the service
    /// produced them; an `Err` item ends the session.
    fn stream(&self, request: SpeechRequest) -> BoxStream<'static, Result<SpeechChunk>>;
}
