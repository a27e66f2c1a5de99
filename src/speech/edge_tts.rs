//! Speech through the `edge-tts` command-line client.

use std::path::PathBuf;
use std::process::Stdio;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::model::SpeechChunk;

use super::{SpeechRequest, SpeechService};

/// Default executable name.
pub const DEFAULT_EDGE_TTS: &str = "edge-tts";

const CHUNK_SIZE: usize = 16 * 1024;

/// Runs `edge-tts` once per request and streams its MP3 output.
#[derive(Debug, Clone)]
pub struct EdgeTtsCommand {
    program: PathBuf,
}

impl EdgeTtsCommand {
    /// Use the given executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(request: &SpeechRequest) -> Vec<String> {
        vec![
            "--voice".to_string(),
            request.voice_id().to_string(),
            format!("--rate={}", request.rate),
            "--file".to_string(),
            "/dev/stdin".to_string(),
            "--write-media".to_string(),
            "/dev/stdout".to_string(),
        ]
    }

    fn spawn(&self, request: &SpeechRequest) -> Result<Session> {
        let mut child = Command::new(&self.program)
            .args(Self::args(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Synthesis(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        let (Some(mut stdin), Some(stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(Error::Synthesis("child process pipes unavailable".to_string()));
        };

        let text = request.text.clone();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                log::warn!("Failed to send text to edge-tts: {}", e);
            }
        });
        let stderr = tokio::spawn(async move {
            let mut message = String::new();
            let _ = stderr.read_to_string(&mut message).await;
            message
        });

        Ok(Session {
            child,
            stdout,
            stderr: Some(stderr),
            done: false,
        })
    }
}

impl Default for EdgeTtsCommand {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_TTS)
    }
}

struct Session {
    child: Child,
    stdout: ChildStdout,
    stderr: Option<JoinHandle<String>>,
    done: bool,
}

impl Session {
    /// Next audio chunk; `None` once the process has exited.
    async fn next_chunk(&mut self) -> Option<Result<SpeechChunk>> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        match self.stdout.read(&mut buf).await {
            Ok(0) => {
                self.done = true;
                self.finish().await.err().map(Err)
            }
            Ok(n) => {
                buf.truncate(n);
                Some(Ok(SpeechChunk::audio(buf)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(Error::Synthesis(format!("reading edge-tts output: {}", e))))
            }
        }
    }

    async fn finish(&mut self) -> Result<()> {
        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| Error::Synthesis(format!("waiting for edge-tts: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Synthesis(format!(
                "edge-tts exited with {}: {}",
                status,
                stderr.trim()
            )))
        }
    }
}

impl SpeechService for EdgeTtsCommand {
    fn stream(&self, request: SpeechRequest) -> BoxStream<'static, Result<SpeechChunk>> {
        // Spawning needs a runtime, so it waits for the first poll.
        let command = self.clone();
        stream::once(async move { command.spawn(&request) })
            .flat_map(|spawned| match spawned {
                Ok(session) => stream::unfold(session, |mut session| async move {
                    session.next_chunk().await.map(|item| (item, session))
                })
                .boxed(),
                Err(e) => stream::once(async move { Err(e) }).boxed(),
            })
            .boxed()
    }
}
