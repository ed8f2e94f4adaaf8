//! Command routing: one input line in, exactly one action out.
//!
//! The registry stores, per command, a callable whose arity (nullary or
//! unary) and synchrony (blocking or suspending) are fixed at registration
//! time as an [`Action`] variant. The router never inspects a handler at
//! call time to figure out how to invoke it, and callers never need to know
//! a handler's shape: [`CommandRouter::dispatch`] is the single entry point.

use crate::Dispatch;
use anyhow::{Result, bail};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub type NullaryFn<S> = Box<dyn Fn(Arc<S>) -> Result<String> + Send + Sync>;
pub type UnaryFn<S> = Box<dyn Fn(Arc<S>, String) -> Result<String> + Send + Sync>;
pub type NullaryFutureFn<S> =
    Box<dyn Fn(Arc<S>) -> BoxFuture<'static, Result<String>> + Send + Sync>;
pub type UnaryFutureFn<S> =
    Box<dyn Fn(Arc<S>, String) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// The callable bound to a command name.
///
/// The four variants cover the arity/synchrony matrix; which variant a
/// command uses is decided once, when it is registered.
pub enum Action<S> {
    Nullary(NullaryFn<S>),
    Unary(UnaryFn<S>),
    NullarySuspending(NullaryFutureFn<S>),
    UnarySuspending(UnaryFutureFn<S>),
}

impl<S: Send + Sync + 'static> Action<S> {
    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn(Arc<S>) -> Result<String> + Send + Sync + 'static,
    {
        Action::Nullary(Box::new(f))
    }

    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Arc<S>, String) -> Result<String> + Send + Sync + 'static,
    {
        Action::Unary(Box::new(f))
    }

    pub fn nullary_suspending<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Action::NullarySuspending(Box::new(move |session| Box::pin(f(session))))
    }

    pub fn unary_suspending<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<S>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Action::UnarySuspending(Box::new(move |session, argument| {
            Box::pin(f(session, argument))
        }))
    }

    /// Invokes the callable according to its registered shape.
    ///
    /// Nullary handlers never see the argument; blocking handlers run inline
    /// on the caller's task.
    async fn invoke(&self, session: Arc<S>, argument: String) -> Result<String> {
        match self {
            Action::Nullary(f) => f(session),
            Action::Unary(f) => f(session, argument),
            Action::NullarySuspending(f) => f(session).await,
            Action::UnarySuspending(f) => f(session, argument).await,
        }
    }
}

struct Command<S> {
    action: Action<S>,
    terminal: bool,
}

/// Maps the first token of an input line to a registered action, with a
/// conversational fallback for everything else.
pub struct CommandRouter<S> {
    commands: HashMap<String, Command<S>>,
    fallback: Action<S>,
}

impl<S: Send + Sync + 'static> CommandRouter<S> {
    /// Creates a router whose unrecognized lines are handed, whole, to
    /// `fallback`. The fallback is invoked through the same uniform path as
    /// any registered action, with the full original line as its argument.
    pub fn new(fallback: Action<S>) -> Self {
        Self {
            commands: HashMap::new(),
            fallback,
        }
    }

    /// Registers a command. Names are matched case-insensitively against the
    /// first whitespace-delimited token of a line and must be unique.
    pub fn register(&mut self, name: &str, action: Action<S>) -> Result<()> {
        self.insert(name, action, false)
    }

    /// Registers a command that ends the session after its reply.
    pub fn register_terminal(&mut self, name: &str, action: Action<S>) -> Result<()> {
        self.insert(name, action, true)
    }

    fn insert(&mut self, name: &str, action: Action<S>, terminal: bool) -> Result<()> {
        let name = name.to_lowercase();
        if self.commands.contains_key(&name) {
            bail!("duplicate command name: '{name}'");
        }
        self.commands.insert(name, Command { action, terminal });
        Ok(())
    }

    /// The registered command names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Routes one raw input line.
    ///
    /// The line is trimmed and lower-cased, then split at the first space
    /// into an action token and a remainder argument (empty when absent).
    /// Empty lines are skipped without running anything. An unrecognized
    /// leading token sends the full line to the fallback.
    pub async fn dispatch(&self, session: &Arc<S>, raw: &str) -> Result<Dispatch> {
        let line = raw.trim().to_lowercase();
        if line.is_empty() {
            return Ok(Dispatch::Skipped);
        }

        let (action, argument) = match line.split_once(' ') {
            Some((head, rest)) => (head, rest.trim()),
            None => (line.as_str(), ""),
        };

        match self.commands.get(action) {
            Some(command) => {
                debug!(command = action, argument, "dispatching");
                let reply = command
                    .action
                    .invoke(Arc::clone(session), argument.to_string())
                    .await?;
                if command.terminal {
                    Ok(Dispatch::Farewell(reply))
                } else {
                    Ok(Dispatch::Reply(reply))
                }
            }
            None => {
                debug!(line = %line, "no command matched; falling back to resolver");
                let reply = self.fallback.invoke(Arc::clone(session), line).await?;
                Ok(Dispatch::Reply(reply))
            }
        }
    }
}
