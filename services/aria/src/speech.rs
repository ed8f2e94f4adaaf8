use async_trait::async_trait;
use tracing::warn;

/// Speaks replies to the user.
///
/// Implementations must not propagate failures to the caller; a reply that
/// cannot be voiced is still printed, and the problem is logged.
#[async_trait]
pub trait VoiceOutput: Send + Sync {
    async fn speak(&self, text: &str);
}

/// Console output with optional platform text-to-speech.
pub struct ConsoleVoice {
    tts_program: Option<&'static str>,
}

impl ConsoleVoice {
    pub fn new(tts_enabled: bool) -> Self {
        let tts_program = if tts_enabled {
            default_tts_program()
        } else {
            None
        };
        if tts_enabled && tts_program.is_none() {
            warn!("no text-to-speech program known for this platform; replies are print-only");
        }
        Self { tts_program }
    }
}

/// The stock speech synthesizer shipped with each supported platform.
fn default_tts_program() -> Option<&'static str> {
    match std::env::consts::OS {
        "macos" => Some("say"),
        "linux" => Some("espeak"),
        _ => None,
    }
}

#[async_trait]
impl VoiceOutput for ConsoleVoice {
    async fn speak(&self, text: &str) {
        println!("\n[ARIA]: {text}");
        if let Some(program) = self.tts_program {
            match tokio::process::Command::new(program).arg(text).status().await {
                Ok(status) if status.success() => {}
                Ok(status) => warn!(%status, program, "text-to-speech exited with failure"),
                Err(err) => warn!(error = ?err, program, "failed to run text-to-speech"),
            }
        }
    }
}
