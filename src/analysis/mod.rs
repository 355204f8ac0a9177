//! Analysis orchestration.
//!
//! The pipeline fans out per-article analysis and then runs the single
//! synthesis step.

pub mod pipeline;
pub mod synthesis;

pub use pipeline::{probe_articles, Pipeline};
