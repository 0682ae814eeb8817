//! Services layer for ratinglens
//!
//! Provides the completion service integration used to turn a relevant
//! record subset into a natural-language answer.

pub mod completion;

use crate::error::Result;
use async_trait::async_trait;

pub use completion::{CompletionAnalyzer, OpenAiClient};

/// Completion service trait defining the single operation the analyzer needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Request a completion for a system instruction and a user prompt
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}
