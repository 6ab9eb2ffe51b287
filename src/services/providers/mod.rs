/// Generative model provider abstraction
///
/// The gateway only needs two things from a model: one structured-output
/// call constrained by an [`OutputShape`] schema, and one streamed free-text
/// call. Providers implement both so tests can swap in a mock.
use futures::stream::BoxStream;
use serde_json::Value;

use crate::{error::AppResult, models::OutputShape};

pub mod openai;
pub mod sse;

pub use openai::OpenAiProvider;

/// Ordered text fragments from a streamed completion
pub type TextStream = BoxStream<'static, AppResult<String>>;

/// Trait for generative model providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request output conforming to `shape`'s JSON Schema
    ///
    /// Returns the parsed JSON object; shape validation is left to
    /// [`OutputShape::normalize`].
    async fn generate_object(&self, prompt: &str, shape: OutputShape) -> AppResult<Value>;

    /// Start a streamed free-text completion
    async fn stream_text(&self, prompt: &str) -> AppResult<TextStream>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
