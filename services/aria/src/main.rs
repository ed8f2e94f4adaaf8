//! Main entrypoint for the Aria assistant.
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment (with CLI overrides).
//! 2. Initializing logging.
//! 3. Initializing the generative model, weather client, and opener.
//! 4. Registering the command set and driving the session loop.

use aria_core::llm_client::{GenerativeModel, OpenAICompatibleModel};
use aria_core::profile::UserProfile;
use aria_core::reminders::ReminderStore;
use aria_core::resolver::{ResponseResolver, default_rules};
use aria_service::config::Config;
use aria_service::input::TextPrompt;
use aria_service::opener::SystemOpener;
use aria_service::session::{Session, build_router, run};
use aria_service::speech::ConsoleVoice;
use aria_service::weather::OpenWeatherMap;
use async_openai::config::OpenAIConfig;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// A hands-free personal assistant console.
#[derive(Parser, Debug)]
#[command(name = "aria", version, about)]
struct Cli {
    /// Speak replies aloud through the platform text-to-speech program.
    #[arg(long)]
    speak: bool,
    /// Override the chat model from configuration.
    #[arg(long)]
    model: Option<String>,
}

/// System prompt for the conversational fallback.
fn persona(profile: &UserProfile) -> String {
    format!(
        "You are Aria, a concise personal assistant speaking with calm, technical \
         precision. Your primary user is {} in {}, interested in {}. Answer in a short \
         paragraph suitable for being read aloud.",
        profile.name,
        profile.location,
        profile.interests.join(", ")
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            return ExitCode::from(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing session...");

    let profile = config.profile();
    let chat_model = cli.model.unwrap_or_else(|| config.chat_model.clone());

    let model: Option<Arc<dyn GenerativeModel>> = match &config.openai_api_key {
        Some(api_key) => {
            let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
            if let Some(base) = &config.chat_api_base {
                openai_config = openai_config.with_api_base(base);
            }
            info!(model = %chat_model, "conversational model initialized");
            Some(Arc::new(OpenAICompatibleModel::new(
                openai_config,
                chat_model,
                persona(&profile),
            )))
        }
        None => {
            info!("no chat API key configured; conversational fallback is offline");
            None
        }
    };

    let session = Arc::new(Session {
        resolver: ResponseResolver::new(default_rules(&profile), model),
        profile,
        reminders: Mutex::new(ReminderStore::new()),
        weather: Arc::new(OpenWeatherMap::new(config.weather_api_key.clone())),
        opener: Arc::new(SystemOpener::new()),
    });

    let router = match build_router() {
        Ok(router) => router,
        Err(err) => {
            error!(error = ?err, "command registration failed");
            return ExitCode::from(1);
        }
    };

    let mut input = TextPrompt::new(&session.profile.name);
    let voice = ConsoleVoice::new(config.tts_enabled || cli.speak);

    // The prompt catches Ctrl-C while waiting for input; this outer select
    // catches it during any other suspension point (weather, generation).
    tokio::select! {
        result = run(Arc::clone(&session), &router, &mut input, &voice) => match result {
            Ok(end) => {
                info!(?end, "session ended");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!(error = ?err, "session loop terminated on an unhandled error");
                ExitCode::from(1)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n-- Manual override detected. Shutting down. --");
            ExitCode::SUCCESS
        }
    }
}
