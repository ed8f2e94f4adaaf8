//! Core logic for the Aria assistant.
//!
//! This crate holds everything that can be exercised without touching a
//! terminal, a microphone, or the network: the command router, the response
//! resolver, the generative-model seam, the user profile, and the reminder
//! store. The `aria-service` binary wires these up to real adapters.

pub mod llm_client;
pub mod profile;
pub mod reminders;
pub mod resolver;
pub mod router;

/// Represents the outcome of routing one input line.
///
/// This enum is the primary API for decoupling dispatch decisions from the
/// session loop's execution of side effects (speaking a reply or ending the
/// session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The line was empty; nothing ran and nothing should be spoken.
    Skipped,
    /// A handler (or the conversational fallback) produced a reply.
    Reply(String),
    /// A terminal command ran; the session should end after this reply.
    Farewell(String),
}
