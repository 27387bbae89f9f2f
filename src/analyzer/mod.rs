//! Analyzer module
//!
//! Owns the lifecycle of an audit run: fetch the main page, run the
//! checkers concurrently, and fold their results into a [`crate::Report`].

mod orchestrator;
mod state;

pub use orchestrator::Analyzer;
pub use state::{RunState, RunTracker};
