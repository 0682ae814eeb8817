//! Query analysis pipeline
//!
//! Tiered relevance filtering, compact serialization for prompting, the
//! deterministic local fallback, and the orchestrator that sequences a full
//! query run.

pub mod fallback;
pub mod pipeline;
pub mod relevance;
pub mod serialize;

pub use fallback::analyze_locally;
pub use pipeline::Orchestrator;
pub use relevance::{filter, vocabulary};
pub use serialize::to_delimited_text;
