//! Accumulates a speech stream into one audio buffer.

use std::sync::Arc;

use futures::StreamExt;

use crate::error::{Error, Result};
use crate::model::{AudioBuffer, SpeechRate, VoiceProfile};

use super::{SpeechRequest, SpeechService};

/// Turns text into a complete audio buffer through a [`SpeechService`].
#[derive(Clone)]
pub struct VoiceSynthesizer {
    service: Arc<dyn SpeechService>,
}

impl VoiceSynthesizer {
    /// Synthesizer over the given service.
    pub fn new(service: Arc<dyn SpeechService>) -> Self {
        Self { service }
    }

    /// Speak `text` with `voice` at `rate`.
    ///
    /// Only audio chunks are kept, in arrival order. Either the whole
    /// buffer is returned or an [`Error::Synthesis`]; a session that fails
    /// halfway or yields no audio returns no bytes at all.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: VoiceProfile,
        rate: &SpeechRate,
    ) -> Result<AudioBuffer> {
        let request = SpeechRequest::new(text, voice, rate.clone());
        log::info!(
            "Synthesizing {} chars with {} at {}",
            text.chars().count(),
            voice,
            rate
        );

        let mut stream = self.service.stream(request);
        let mut buffer = AudioBuffer::new();
        let mut skipped = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| match e {
                Error::Synthesis(_) => e,
                other => Error::Synthesis(other.to_string()),
            })?;
            if chunk.is_audio() {
                buffer.append(&chunk.data);
            } else {
                skipped += 1;
            }
        }

        if buffer.is_empty() {
            return Err(Error::Synthesis("speech service returned no audio".to_string()));
        }
        log::debug!("Synthesized {} bytes ({} metadata chunks skipped)", buffer.len(), skipped);
        Ok(buffer)
    }
}

impl std::fmt::Debug for VoiceSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSynthesizer").finish_non_exhaustive()
    }
}
