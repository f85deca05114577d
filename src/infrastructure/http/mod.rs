//! Keep-alive HTTP endpoint for hosting platforms that probe a port

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use crate::application::errors::BotError;
use crate::application::messaging::templates;

#[derive(Clone)]
struct HealthState {
    bot_name: Arc<str>,
}

async fn health(State(state): State<HealthState>) -> Html<String> {
    Html(templates::health_page(&state.bot_name))
}

pub fn router(bot_name: &str) -> Router {
    Router::new().route("/", get(health)).with_state(HealthState {
        bot_name: Arc::from(bot_name),
    })
}

/// Serve the health page on `0.0.0.0:port` until the task is dropped
pub async fn serve(port: u16, bot_name: String) -> Result<(), BotError> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BotError::Network(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("🌐 Server running on port {}", port);
    axum::serve(listener, router(&bot_name))
        .await
        .map_err(|e| BotError::Network(e.to_string()))
}
