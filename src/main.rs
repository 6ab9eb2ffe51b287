use std::sync::Arc;

use recommender_api::{
    create_router,
    services::{CompletionProvider, OpenAiProvider},
    AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommender_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let provider: Option<Arc<dyn CompletionProvider>> = match config.api_key() {
        Some(api_key) => {
            tracing::info!(
                api_url = %config.openai_api_url,
                model = %config.openai_model,
                "Using OpenAI provider"
            );
            Some(Arc::new(OpenAiProvider::new(
                api_key.to_string(),
                config.openai_api_url.clone(),
                config.openai_model.clone(),
            )))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY is not set, generation requests will fail");
            None
        }
    };

    let app = create_router(AppState::new(provider));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
