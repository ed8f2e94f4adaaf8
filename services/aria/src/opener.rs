//! Launching websites and local applications.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("no application mapping for '{0}' on this platform")]
    NotConfigured(String),
    #[error("launch failed: {0}")]
    Launch(#[from] std::io::Error),
}

/// A disambiguated open request: anything containing a dot is treated as a
/// web address, everything else as a named local application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Url(String),
    App(String),
}

/// Classifies a raw `open` argument, normalizing bare domains to HTTPS.
pub fn classify(target: &str) -> Target {
    let target = target.trim();
    if target.contains('.') {
        let url = if target.starts_with("http") {
            target.to_string()
        } else {
            format!("https://{target}")
        };
        Target::Url(url)
    } else {
        Target::App(target.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Opener: Send + Sync {
    async fn open(&self, target: Target) -> Result<(), OpenError>;
}

/// Launches URLs through the platform browser opener and applications from a
/// fixed per-OS table.
pub struct SystemOpener {
    programs: HashMap<&'static str, &'static str>,
}

impl SystemOpener {
    pub fn new() -> Self {
        Self {
            programs: program_table(std::env::consts::OS),
        }
    }
}

impl Default for SystemOpener {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-name to launch-command table, keyed by `std::env::consts::OS`
/// values.
fn program_table(os: &str) -> HashMap<&'static str, &'static str> {
    match os {
        "windows" => HashMap::from([
            ("notepad", "notepad.exe"),
            ("calculator", "calc.exe"),
            ("paint", "mspaint.exe"),
            ("cmd", "cmd.exe"),
            ("explorer", "explorer.exe"),
        ]),
        "macos" => HashMap::from([
            ("safari", "Safari"),
            ("notes", "Notes"),
            ("calculator", "Calculator"),
            ("terminal", "Terminal"),
        ]),
        "linux" => HashMap::from([
            ("terminal", "gnome-terminal"),
            ("calculator", "gnome-calculator"),
            ("browser", "firefox"),
        ]),
        _ => HashMap::new(),
    }
}

/// The platform command that hands a URL to the default browser.
fn url_launcher() -> (&'static str, &'static [&'static str]) {
    match std::env::consts::OS {
        "macos" => ("open", &[]),
        "windows" => ("cmd", &["/C", "start"]),
        _ => ("xdg-open", &[]),
    }
}

#[async_trait]
impl Opener for SystemOpener {
    async fn open(&self, target: Target) -> Result<(), OpenError> {
        match target {
            Target::Url(url) => {
                let (program, args) = url_launcher();
                info!(%url, "opening in browser");
                tokio::process::Command::new(program)
                    .args(args)
                    .arg(&url)
                    .spawn()?;
                Ok(())
            }
            Target::App(name) => {
                let key = name.to_lowercase();
                let command = self
                    .programs
                    .get(key.trim())
                    .ok_or_else(|| OpenError::NotConfigured(name.clone()))?;
                info!(app = %name, %command, "launching application");
                if std::env::consts::OS == "macos" {
                    tokio::process::Command::new("open")
                        .arg("-a")
                        .arg(command)
                        .spawn()?;
                } else {
                    tokio::process::Command::new(command).spawn()?;
                }
                Ok(())
            }
        }
    }
}
