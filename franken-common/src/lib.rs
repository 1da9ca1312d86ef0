//! Shared plumbing for the franken-snips workspace.
//!
//! This crate carries the pieces every other crate leans on: the tracing
//! initialiser that binaries and integration tests call once at startup, and
//! the cancellation combinators used to tie browser work to both a run-wide
//! stop signal and the browser session's own lifetime.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`cancel`]: [`CancellationToken`] combinators ([`cancel::first_of`],
//!   [`cancel::until_cancelled`])
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod cancel;
pub mod observability;

pub use cancel::{first_of, until_cancelled, LinkedScope};
pub use observability::{init_logging, LogConfig, LogFormat};
