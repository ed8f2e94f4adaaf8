//! The handler behind each registered command.
//!
//! Handlers return the reply text; the session loop owns speaking it. Every
//! external-collaborator failure is converted to a user-facing message here,
//! so a handler only errors on a genuine programming fault.

use crate::opener::{OpenError, Target, classify};
use crate::session::Session;
use crate::weather::WeatherError;
use aria_core::profile::UserProfile;
use chrono::Local;
use rand::Rng;
use std::sync::Arc;
use tracing::warn;

const MISSING_TASK_REPLY: &str = "The task parameter is missing. Please state the command \
     clearly, for example: 'set task review code'.";

/// Canned analytical reports for `generate report`.
const REPORTS: [&str; 3] = [
    "Hypothesis: The integration of quantum computing will reduce current processing time \
     metrics by a factor of 10^9 within the next fiscal cycle. Key challenges involve qubit \
     stability and environmental decoherence.",
    "Analytical Report: Observed data suggests a correlation between modular coding \
     architecture and a 42% reduction in post-deployment critical failures. Standardization \
     is mandatory for scaling.",
    "System Log Analysis: External API latency spike detected at 02:45 UTC, attributed to a \
     transient network bottleneck on the European gateway. No data loss occurred, but \
     redundancy protocols were activated.",
];

/// The command index printed by `help`.
pub fn help_text() -> String {
    [
        "Available commands:",
        "  - time: Retrieve current date and time.",
        "  - status: Get the assistant's current operational status.",
        "  - analyze [query]: Run a query through the analysis chain (e.g. 'analyze how are you').",
        "  - generate report: Produce an analytical report.",
        "  - weather [city]: Fetch environmental data (e.g. 'weather London').",
        "  - search [query]: Search the web for a given query.",
        "  - open [app/website]: Open an application or website (e.g. 'open notepad', 'open example.com').",
        "  - set task [task]: Log a new task (e.g. 'set task buy milk').",
        "  - view tasks: Display the list of active tasks.",
        "  - clear tasks: Purge all tasks from the log.",
        "  - help: Display this command index.",
        "  - exit: Shut down the console.",
    ]
    .join("\n")
}

/// Current date and time.
pub fn current_time() -> String {
    let now = Local::now();
    format!(
        "The current date is {}, and the time is {}.",
        now.format("%A, %d %B %Y"),
        now.format("%I:%M %p")
    )
}

/// Operational status, with an efficiency figure that stays reassuring.
pub fn status_line(profile: &UserProfile) -> String {
    let efficiency: u8 = rand::rng().random_range(99..=100);
    format!(
        "Current operational status: {}. All modules are functioning with {}% efficiency.",
        profile.status_level, efficiency
    )
}

/// Personalized farewell for the terminal commands.
pub fn farewell(profile: &UserProfile) -> String {
    format!(
        "System shutdown initialized. Standby mode activated. Goodbye, {}.",
        profile.name
    )
}

/// Free-form analysis through the resolver chain.
pub async fn analyze(session: Arc<Session>, query: String) -> String {
    session.resolver.resolve(&query).await
}

/// `generate report` emits a canned analytical report; any other argument is
/// treated as conversation.
pub async fn generate(session: Arc<Session>, argument: String) -> String {
    if argument == "report" {
        let pick = rand::rng().random_range(0..REPORTS.len());
        format!(
            "Analytical synthesis complete. Displaying generated report: {}",
            REPORTS[pick]
        )
    } else {
        analyze(session, format!("generate {argument}")).await
    }
}

/// `view tasks` enumerates the reminder log; anything else is conversation.
pub async fn view(session: Arc<Session>, argument: String) -> String {
    if argument != "tasks" {
        return analyze(session, format!("view {argument}")).await;
    }

    let reminders = session.reminders.lock().await;
    if reminders.is_empty() {
        return "No active tasks are currently logged in the memory matrix.".to_string();
    }
    let mut lines = vec!["Displaying active task log:".to_string()];
    for (index, reminder) in reminders.list().iter().enumerate() {
        lines.push(format!(
            "  {}: Logged {} - {}",
            index + 1,
            reminder.timestamp,
            reminder.task
        ));
    }
    lines.join("\n")
}

/// `clear tasks` purges the reminder log; anything else is conversation.
pub async fn clear(session: Arc<Session>, argument: String) -> String {
    if argument != "tasks" {
        return analyze(session, format!("clear {argument}")).await;
    }

    let mut reminders = session.reminders.lock().await;
    if reminders.is_empty() {
        "Task log is empty. No action required.".to_string()
    } else {
        reminders.clear();
        "All active tasks have been successfully purged from the log. Memory status: Clear."
            .to_string()
    }
}

/// `set task <task>` logs a reminder; any other `set ...` is conversation.
pub async fn set(session: Arc<Session>, argument: String) -> String {
    match argument.strip_prefix("task") {
        Some(rest) => {
            let task = rest.trim();
            if task.is_empty() {
                MISSING_TASK_REPLY.to_string()
            } else {
                let reminder = session.reminders.lock().await.add(task);
                format!(
                    "Task '{}' successfully logged at {}. Priority set to standard.",
                    reminder.task, reminder.timestamp
                )
            }
        }
        None => analyze(session, format!("set {argument}")).await,
    }
}

/// Environmental conditions for a location.
pub async fn weather(session: Arc<Session>, location: String) -> String {
    if location.is_empty() {
        return "The location parameter is missing. Please state the command clearly, for \
                example: 'weather London'."
            .to_string();
    }

    match session.weather.fetch(&location).await {
        Ok(report) => format!(
            "Current environmental conditions for {}: Temperature is {:.1}°C. Humidity is \
             at {}%. Observed condition: {}.",
            report.city, report.temperature_c, report.humidity, report.condition
        ),
        Err(WeatherError::Unconfigured) => {
            "Weather module is currently uncalibrated. API key is missing. Please update \
             the configuration."
                .to_string()
        }
        Err(WeatherError::NotFound(message)) => {
            format!("Error accessing environmental data for {location}: {message}")
        }
        Err(err @ WeatherError::Network(_)) => {
            warn!(error = ?err, "weather fetch failed");
            "Network connection failure. Unable to access external environmental data \
             service."
                .to_string()
        }
    }
}

/// Web search through the default browser.
pub async fn search(session: Arc<Session>, query: String) -> String {
    if query.is_empty() {
        return "The search query is missing. Please state the command clearly, for \
                example: 'search rust borrow checker'."
            .to_string();
    }

    let url = format!("https://www.google.com/search?q={}", query.replace(' ', "+"));
    match session.opener.open(Target::Url(url)).await {
        Ok(()) => format!("Querying global information network for: {query}."),
        Err(err) => {
            warn!(error = ?err, "search launch failed");
            format!("Unable to reach the information network: {err}.")
        }
    }
}

/// Opens a website or a local application, disambiguated by a dot in the
/// target.
pub async fn open(session: Arc<Session>, target: String) -> String {
    if target.is_empty() {
        return "The open target is missing. Please state the command clearly, for \
                example: 'open example.com'."
            .to_string();
    }

    match classify(&target) {
        Target::Url(url) => match session.opener.open(Target::Url(url.clone())).await {
            Ok(()) => format!("Executing web traversal to {url}."),
            Err(err) => {
                warn!(error = ?err, "url launch failed");
                format!("A critical error occurred while opening {url}: {err}")
            }
        },
        Target::App(app) => match session.opener.open(Target::App(app.clone())).await {
            Ok(()) => format!("Affirmative. Opening {app}."),
            Err(OpenError::NotConfigured(_)) => {
                format!("I don't have a configuration for the application '{app}'.")
            }
            Err(err) => {
                warn!(error = ?err, "application launch failed");
                format!("A critical error occurred while opening {app}: {err}")
            }
        },
    }
}
