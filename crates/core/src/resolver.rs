//! Response resolution: canned keyword rules ahead of the generative model.
//!
//! Deterministic rules guarantee fast, reliable answers for anticipated
//! high-value queries without depending on the model being configured; the
//! model is reserved for genuine open-domain fallback.

use crate::llm_client::{Exchange, GenerativeModel};
use crate::profile::UserProfile;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Reply used when the generative capability never initialized.
pub const OFFLINE_REPLY: &str =
    "My advanced conversational matrix is offline. I cannot process the query.";

/// One deterministic keyword rule.
///
/// Rules are evaluated in list order and the first rule with any trigger
/// occurring as a substring of the lower-cased input wins. The order of the
/// default rule set is part of the observable contract, not an
/// implementation detail.
#[derive(Debug, Clone)]
pub struct ResolutionRule {
    pub triggers: Vec<&'static str>,
    pub reply: String,
}

impl ResolutionRule {
    pub fn new(triggers: Vec<&'static str>, reply: impl Into<String>) -> Self {
        Self {
            triggers,
            reply: reply.into(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|trigger| lowered.contains(trigger))
    }
}

/// The default rule set, personalized from the user profile.
pub fn default_rules(profile: &UserProfile) -> Vec<ResolutionRule> {
    vec![
        ResolutionRule::new(
            vec!["how are you", "status report", "condition"],
            "My core systems are operating within defined parameters. I am fully engaged \
             and ready for high-level information processing.",
        ),
        ResolutionRule::new(
            vec!["security threat", "vulnerability", "risk assessment"],
            format!(
                "Risk assessment initiated. While no immediate threats are detected, I \
                 recommend reviewing best practices for {} to maintain network integrity.",
                profile.security_interest()
            ),
        ),
        ResolutionRule::new(
            vec!["who is your friend", "who's your friend"],
            format!(
                "That is easy. My friend and primary collaborator is {}.",
                profile.name
            ),
        ),
        ResolutionRule::new(
            vec!["who created you", "your maker"],
            format!(
                "My designation originates from my primary user and programmer, {}.",
                profile.name
            ),
        ),
        ResolutionRule::new(
            vec!["inspire me", "motivate", "positive"],
            "Your current trajectory is optimal. Maintain focus on complex \
             problem-solving. Success is the logical result of persistent effort.",
        ),
    ]
}

/// Chooses between canned replies and the generative fallback.
pub struct ResponseResolver {
    rules: Vec<ResolutionRule>,
    model: Option<Arc<dyn GenerativeModel>>,
    history: Mutex<Vec<Exchange>>,
}

impl ResponseResolver {
    /// `model` is `None` when the generative capability failed to initialize;
    /// the resolver then answers unmatched queries with a fixed offline
    /// notice instead of erroring.
    pub fn new(rules: Vec<ResolutionRule>, model: Option<Arc<dyn GenerativeModel>>) -> Self {
        if model.is_none() {
            warn!("generative model unavailable; open queries get the offline notice");
        }
        Self {
            rules,
            model,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Produces a reply for free-form text.
    ///
    /// Never returns an error: model failures are converted into user-facing
    /// messages here. An initialization failure and a runtime failure produce
    /// two distinct, distinguishable reports.
    pub async fn resolve(&self, input: &str) -> String {
        let lowered = input.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&lowered)) {
            debug!(trigger = ?rule.triggers.first(), "canned rule matched");
            return rule.reply.clone();
        }

        let Some(model) = &self.model else {
            return OFFLINE_REPLY.to_string();
        };

        let mut history = self.history.lock().await;
        match model.generate(input, &history).await {
            Ok(reply) => {
                history.push(Exchange {
                    user: input.to_string(),
                    reply: reply.clone(),
                });
                reply
            }
            Err(err) => {
                error!(error = ?err, "generation failed");
                format!("A critical error occurred during analysis: {err}")
            }
        }
    }
}
