//! Aria Service Library Crate
//!
//! This library contains everything the `aria` binary needs beyond
//! `aria-core`: configuration, the input/output adapters, the weather and
//! opener clients, the command handlers, and the session loop. The
//! `main.rs` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod input;
pub mod opener;
pub mod session;
pub mod speech;
pub mod weather;
