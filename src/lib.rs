//! Ratinglens - Free-text Q&A over a session ratings spreadsheet
//!
//! Answers natural-language questions about instructor session ratings by:
//! - Fetching the ratings tab from a shared spreadsheet
//! - Structuring raw rows into header-keyed records
//! - Narrowing the dataset to the records a question is about
//! - Asking a completion model for the answer, with a deterministic local
//!   fallback when the model is unavailable
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (RawSheet, Record, AnalysisOutcome)
//! - **Sheets**: Spreadsheet client, data source, and structurer
//! - **Analysis**: Relevance filtering, serialization, fallback, pipeline
//! - **Services**: Completion API integration
//! - **Api**: HTTP server exposing the pipeline
//!
//! # Example
//!
//! ```ignore
//! use ratinglens_core::analysis::Orchestrator;
//! use ratinglens_core::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env();
//!     settings.validate()?;
//!
//!     let orchestrator = Orchestrator::from_settings(&settings)?;
//!     let outcome = orchestrator
//!         .analyze_query("What is John Doe's average rating?")
//!         .await;
//!
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod doctor;
pub mod error;
pub mod services;
pub mod sheets;
pub mod types;

// Re-export commonly used types
pub use analysis::Orchestrator;
pub use config::Settings;
pub use error::{RatinglensError, Result};
pub use sheets::{GoogleSheetsClient, SheetSource};
pub use types::{AnalysisOutcome, Record, RecordSet};
