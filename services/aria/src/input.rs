use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// How one attempt to acquire an input line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A line of input, already trimmed and lower-cased. May be empty when a
    /// capture timed out or nothing intelligible was said; empty lines are
    /// skipped by the router.
    Line(String),
    /// The user interrupted the wait (Ctrl-C).
    Interrupted,
}

/// Source of one command line per call: typed entry or transcribed speech.
#[async_trait]
pub trait InputSource: Send {
    async fn acquire_line(&mut self) -> Result<InputEvent>;
}

/// Text-mode input: an async prompt over stdin.
pub struct TextPrompt {
    prompt: String,
    lines: Lines<BufReader<Stdin>>,
}

impl TextPrompt {
    pub fn new(user_name: &str) -> Self {
        Self {
            prompt: format!("\n[{user_name}] > "),
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl InputSource for TextPrompt {
    async fn acquire_line(&mut self) -> Result<InputEvent> {
        print!("{}", self.prompt);
        std::io::stdout().flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => Ok(InputEvent::Interrupted),
            line = self.lines.next_line() => match line? {
                Some(line) => Ok(InputEvent::Line(line.trim().to_lowercase())),
                // Closed stdin behaves like an explicit exit.
                None => Ok(InputEvent::Line("exit".to_string())),
            },
        }
    }
}
