use std::sync::Arc;

use cartwise_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, PgFeedbackSink},
    services::{FeedbackSink, InMemoryFeedbackSink},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartwise_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let feedback: Arc<dyn FeedbackSink> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = create_pool(database_url, config.database_max_connections).await?;
            let sink = PgFeedbackSink::new(pool);
            sink.migrate().await?;
            Arc::new(sink)
        }
        None => Arc::new(InMemoryFeedbackSink::with_capacity(
            config.memory_feedback_capacity,
        )),
    };

    let bind_address = config.bind_address();
    let state = AppState::new(config, feedback);

    tracing::info!(
        feedback_sink = state.recommendations.feedback_sink_name(),
        "Recommendation service initialised"
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
