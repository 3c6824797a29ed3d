//! Service facade.
//!
//! The [`Orchestrator`] owns the queue, history, dispatcher, status
//! aggregator and admin controls, resolves processing requests against the
//! library managers, and is the only thing the HTTP layer talks to.

mod service;
mod types;

pub use service::{Orchestrator, OrchestratorDeps};
pub use types::{ProcessingView, SeriesSubmission, SubmitError};
