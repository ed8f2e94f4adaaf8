//! Session state, command registration, and the interactive loop.

use crate::handlers;
use crate::input::{InputEvent, InputSource};
use crate::opener::Opener;
use crate::speech::VoiceOutput;
use crate::weather::WeatherProvider;
use anyhow::Result;
use aria_core::Dispatch;
use aria_core::profile::UserProfile;
use aria_core::reminders::ReminderStore;
use aria_core::resolver::ResponseResolver;
use aria_core::router::{Action, CommandRouter};
use chrono::{Local, Timelike};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared session context, created once at startup and passed to every
/// handler. Both mutable members sit behind async mutexes; today a single
/// loop owns them, but a second session would already be safe.
pub struct Session {
    pub profile: UserProfile,
    pub reminders: Mutex<ReminderStore>,
    pub resolver: ResponseResolver,
    pub weather: Arc<dyn WeatherProvider>,
    pub opener: Arc<dyn Opener>,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A terminal command (`exit`, `quit`, `shutdown`) ran.
    Shutdown,
    /// The user interrupted the prompt.
    Interrupted,
}

/// The boot greeting, varying with the local hour.
pub fn greeting(profile: &UserProfile) -> String {
    let hour = Local::now().hour();
    let salutation = if (5..12).contains(&hour) {
        "Good morning"
    } else if (12..18).contains(&hour) {
        "Good afternoon"
    } else {
        "Good evening"
    };
    format!(
        "System boot sequence complete. {salutation}, {}. Current status is {}. How may I \
         prioritize your tasks?",
        profile.name, profile.status_level
    )
}

/// Registers the full command set.
///
/// Each command's arity and synchrony are pinned here by the `Action`
/// constructor it is registered with. Lines matching no name fall back to
/// the resolver with the full original line.
pub fn build_router() -> Result<CommandRouter<Session>> {
    let mut router = CommandRouter::new(Action::unary_suspending(
        |session: Arc<Session>, line: String| async move {
            Ok(session.resolver.resolve(&line).await)
        },
    ));

    router.register("help", Action::nullary(|_| Ok(handlers::help_text())))?;
    router.register("time", Action::nullary(|_| Ok(handlers::current_time())))?;
    router.register(
        "status",
        Action::nullary(|session: Arc<Session>| Ok(handlers::status_line(&session.profile))),
    )?;
    router.register(
        "analyze",
        Action::unary_suspending(|session, query| async move {
            Ok(handlers::analyze(session, query).await)
        }),
    )?;
    router.register(
        "generate",
        Action::unary_suspending(|session, argument| async move {
            Ok(handlers::generate(session, argument).await)
        }),
    )?;
    router.register(
        "view",
        Action::unary_suspending(|session, argument| async move {
            Ok(handlers::view(session, argument).await)
        }),
    )?;
    router.register(
        "clear",
        Action::unary_suspending(|session, argument| async move {
            Ok(handlers::clear(session, argument).await)
        }),
    )?;
    router.register(
        "set",
        Action::unary_suspending(|session, argument| async move {
            Ok(handlers::set(session, argument).await)
        }),
    )?;
    router.register(
        "weather",
        Action::unary_suspending(|session, location| async move {
            Ok(handlers::weather(session, location).await)
        }),
    )?;
    router.register(
        "search",
        Action::unary_suspending(|session, query| async move {
            Ok(handlers::search(session, query).await)
        }),
    )?;
    router.register(
        "open",
        Action::unary_suspending(|session, target| async move {
            Ok(handlers::open(session, target).await)
        }),
    )?;
    for name in ["exit", "quit", "shutdown"] {
        router.register_terminal(
            name,
            Action::nullary(|session: Arc<Session>| Ok(handlers::farewell(&session.profile))),
        )?;
    }

    Ok(router)
}

/// Drives the read-respond loop until a terminal command, an interrupt, or
/// an unexpected error.
///
/// Collaborator failures never reach this function; they are converted to
/// replies inside the handlers. An `Err` here is the one intentionally fatal
/// case: a generic failure is spoken and the error propagates to `main`.
pub async fn run(
    session: Arc<Session>,
    router: &CommandRouter<Session>,
    input: &mut dyn InputSource,
    voice: &dyn VoiceOutput,
) -> Result<SessionEnd> {
    voice.speak(&greeting(&session.profile)).await;

    loop {
        match input.acquire_line().await? {
            InputEvent::Interrupted => {
                voice
                    .speak("User interrupt detected. System going to standby mode.")
                    .await;
                return Ok(SessionEnd::Interrupted);
            }
            InputEvent::Line(line) => match router.dispatch(&session, &line).await {
                Ok(Dispatch::Skipped) => continue,
                Ok(Dispatch::Reply(text)) => voice.speak(&text).await,
                Ok(Dispatch::Farewell(text)) => {
                    voice.speak(&text).await;
                    info!("terminal command received; ending session");
                    return Ok(SessionEnd::Shutdown);
                }
                Err(err) => {
                    voice.speak("Critical system failure. Contact support.").await;
                    return Err(err);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opener::{MockOpener, Target};
    use crate::weather::{MockWeatherProvider, WeatherError};
    use anyhow::Result as AnyResult;
    use aria_core::llm_client::{Exchange, GenerativeModel};
    use aria_core::resolver::{OFFLINE_REPLY, default_rules};
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Fake generative model that records every query it receives.
    struct ScriptedModel {
        calls: StdMutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new() -> Self {
            Self {
                calls: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, input: &str, _history: &[Exchange]) -> AnyResult<String> {
            self.calls.lock().unwrap().push(input.to_string());
            Ok("scripted reply".to_string())
        }
    }

    fn make_session(
        weather: MockWeatherProvider,
        opener: MockOpener,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> Arc<Session> {
        let profile = UserProfile::default();
        Arc::new(Session {
            resolver: ResponseResolver::new(default_rules(&profile), model),
            profile,
            reminders: Mutex::new(ReminderStore::new()),
            weather: Arc::new(weather),
            opener: Arc::new(opener),
        })
    }

    fn plain_session() -> Arc<Session> {
        make_session(MockWeatherProvider::new(), MockOpener::new(), None)
    }

    async fn reply_for(session: &Arc<Session>, router: &CommandRouter<Session>, line: &str) -> String {
        match router.dispatch(session, line).await.unwrap() {
            Dispatch::Reply(text) | Dispatch::Farewell(text) => text,
            Dispatch::Skipped => panic!("line '{line}' was skipped"),
        }
    }

    #[tokio::test]
    async fn every_documented_command_is_registered() {
        let router = build_router().unwrap();
        let mut names: Vec<&str> = router.names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "analyze", "clear", "exit", "generate", "help", "open", "quit", "search",
                "set", "shutdown", "status", "time", "view", "weather"
            ]
        );
    }

    #[tokio::test]
    async fn set_view_clear_task_scenario() {
        let router = build_router().unwrap();
        let session = plain_session();

        let reply = reply_for(&session, &router, "set task buy milk").await;
        assert!(reply.contains("'buy milk'"));
        assert_eq!(session.reminders.lock().await.len(), 1);

        let reply = reply_for(&session, &router, "view tasks").await;
        assert!(reply.contains("buy milk"));
        assert!(reply.starts_with("Displaying active task log:"));

        let reply = reply_for(&session, &router, "clear tasks").await;
        assert!(reply.contains("purged"));
        assert_eq!(session.reminders.lock().await.len(), 0);

        let reply = reply_for(&session, &router, "view tasks").await;
        assert!(reply.contains("No active tasks"));
    }

    #[tokio::test]
    async fn set_without_a_task_reports_the_missing_parameter() {
        let router = build_router().unwrap();
        let session = plain_session();

        let reply = reply_for(&session, &router, "set task").await;
        assert!(reply.contains("task parameter is missing"));
        assert!(session.reminders.lock().await.is_empty());
    }

    #[tokio::test]
    async fn set_with_another_keyword_falls_back_to_the_resolver() {
        let router = build_router().unwrap();
        let session = plain_session();

        // 'set something-else' re-enters the conversational chain.
        let reply = reply_for(&session, &router, "set a course for mars").await;
        assert_eq!(reply, OFFLINE_REPLY);
        assert!(session.reminders.lock().await.is_empty());
    }

    #[tokio::test]
    async fn open_with_a_domain_is_url_disambiguated() {
        let mut opener = MockOpener::new();
        opener
            .expect_open()
            .with(eq(Target::Url("https://example.com".to_string())))
            .times(1)
            .returning(|_| Ok(()));

        let router = build_router().unwrap();
        let session = make_session(MockWeatherProvider::new(), opener, None);

        let reply = reply_for(&session, &router, "open example.com").await;
        assert!(reply.contains("https://example.com"));
    }

    #[tokio::test]
    async fn open_with_an_unmapped_app_reports_no_configuration() {
        let mut opener = MockOpener::new();
        opener
            .expect_open()
            .times(1)
            .returning(|target| match target {
                Target::App(name) => Err(crate::opener::OpenError::NotConfigured(name)),
                Target::Url(_) => Ok(()),
            });

        let router = build_router().unwrap();
        let session = make_session(MockWeatherProvider::new(), opener, None);

        let reply = reply_for(&session, &router, "open daw").await;
        assert!(reply.contains("don't have a configuration"));
    }

    #[tokio::test]
    async fn search_builds_a_plus_separated_query() {
        let mut opener = MockOpener::new();
        opener
            .expect_open()
            .with(eq(Target::Url(
                "https://www.google.com/search?q=rust+borrow+checker".to_string(),
            )))
            .times(1)
            .returning(|_| Ok(()));

        let router = build_router().unwrap();
        let session = make_session(MockWeatherProvider::new(), opener, None);

        let reply = reply_for(&session, &router, "search rust borrow checker").await;
        assert!(reply.contains("rust borrow checker"));
    }

    #[tokio::test]
    async fn weather_without_key_reports_uncalibrated_module() {
        let mut weather = MockWeatherProvider::new();
        weather
            .expect_fetch()
            .times(1)
            .returning(|_| Err(WeatherError::Unconfigured));

        let router = build_router().unwrap();
        let session = make_session(weather, MockOpener::new(), None);

        let reply = reply_for(&session, &router, "weather london").await;
        assert!(reply.contains("uncalibrated"));
    }

    #[tokio::test]
    async fn weather_without_location_never_touches_the_provider() {
        let mut weather = MockWeatherProvider::new();
        weather.expect_fetch().times(0);

        let router = build_router().unwrap();
        let session = make_session(weather, MockOpener::new(), None);

        let reply = reply_for(&session, &router, "weather").await;
        assert!(reply.contains("location parameter is missing"));
    }

    #[tokio::test]
    async fn canned_status_query_resolves_through_the_fallback() {
        let router = build_router().unwrap();
        let session = plain_session();

        // 'how' is not a registered command, so the full line goes to the
        // resolver, where the first canned rule matches.
        let reply = reply_for(&session, &router, "how are you").await;
        assert!(reply.contains("core systems are operating"));
    }

    #[tokio::test]
    async fn open_domain_query_reaches_the_model_with_the_full_line() {
        let model = Arc::new(ScriptedModel::new());
        let router = build_router().unwrap();
        let session = make_session(
            MockWeatherProvider::new(),
            MockOpener::new(),
            Some(model.clone()),
        );

        let reply = reply_for(&session, &router, "Tell me about quantum gravity").await;
        assert_eq!(reply, "scripted reply");
        assert_eq!(
            *model.calls.lock().unwrap(),
            vec!["tell me about quantum gravity".to_string()]
        );
    }

    #[tokio::test]
    async fn registered_commands_never_hit_the_model() {
        let model = Arc::new(ScriptedModel::new());
        let router = build_router().unwrap();
        let session = make_session(
            MockWeatherProvider::new(),
            MockOpener::new(),
            Some(model.clone()),
        );

        reply_for(&session, &router, "TIME").await;
        reply_for(&session, &router, "help").await;
        reply_for(&session, &router, "status").await;
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn time_command_reports_date_and_time_in_any_casing() {
        let router = build_router().unwrap();
        let session = plain_session();

        let reply = reply_for(&session, &router, "TIME").await;
        assert!(reply.contains("The current date is"));
        assert!(reply.contains("the time is"));
    }

    #[tokio::test]
    async fn all_three_terminal_commands_end_the_session() {
        let router = build_router().unwrap();
        let session = plain_session();

        for line in ["exit", "quit", "shutdown"] {
            match router.dispatch(&session, line).await.unwrap() {
                Dispatch::Farewell(text) => assert!(text.contains("Goodbye")),
                other => panic!("'{line}' produced {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn empty_line_is_ignored() {
        let router = build_router().unwrap();
        let session = plain_session();
        assert_eq!(
            router.dispatch(&session, "   ").await.unwrap(),
            Dispatch::Skipped
        );
    }

    // --- session loop ---

    struct ScriptedInput {
        events: VecDeque<InputEvent>,
    }

    #[async_trait]
    impl InputSource for ScriptedInput {
        async fn acquire_line(&mut self) -> AnyResult<InputEvent> {
            Ok(self
                .events
                .pop_front()
                .unwrap_or(InputEvent::Line("exit".to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingVoice {
        spoken: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl VoiceOutput for RecordingVoice {
        async fn speak(&self, text: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
    }

    #[tokio::test]
    async fn loop_greets_dispatches_and_stops_on_exit() {
        let router = build_router().unwrap();
        let session = plain_session();
        let mut input = ScriptedInput {
            events: VecDeque::from([
                InputEvent::Line(String::new()),
                InputEvent::Line("help".to_string()),
                InputEvent::Line("exit".to_string()),
            ]),
        };
        let voice = RecordingVoice::default();

        let end = run(session, &router, &mut input, &voice).await.unwrap();
        assert_eq!(end, SessionEnd::Shutdown);

        let spoken = voice.spoken.lock().unwrap();
        assert!(spoken[0].contains("System boot sequence complete"));
        // The empty line produced no utterance.
        assert_eq!(spoken.len(), 3);
        assert!(spoken[1].contains("Available commands"));
        assert!(spoken[2].contains("Goodbye"));
    }

    #[tokio::test]
    async fn loop_handles_interrupt_gracefully() {
        let router = build_router().unwrap();
        let session = plain_session();
        let mut input = ScriptedInput {
            events: VecDeque::from([InputEvent::Interrupted]),
        };
        let voice = RecordingVoice::default();

        let end = run(session, &router, &mut input, &voice).await.unwrap();
        assert_eq!(end, SessionEnd::Interrupted);

        let spoken = voice.spoken.lock().unwrap();
        assert!(spoken.last().unwrap().contains("standby"));
    }
}
