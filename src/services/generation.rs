use crate::{
    error::AppResult,
    services::providers::{CompletionProvider, TextStream},
};

/// Opens a free-text completion stream for a client-built prompt
///
/// The text is passed through untouched; splitting it into list entries is
/// left to the client.
pub async fn stream_completion(
    provider: &dyn CompletionProvider,
    prompt: &str,
) -> AppResult<TextStream> {
    tracing::info!(
        provider = provider.name(),
        prompt_chars = prompt.chars().count(),
        "Opening completion stream"
    );

    provider.stream_text(prompt).await
}
