use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::agent::Agent;
use crate::config::HttpServerConfig;
use crate::model::ModelProvider;
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub fn build_router<P>(agent: Arc<Agent<P>>, cors_origins: &[String]) -> Router
where
    P: ModelProvider + 'static,
{
    let state = Arc::new(ServerState::new(agent));
    Router::new()
        .route("/", get(routes::health::banner_handler))
        .route("/chat", post(routes::chat::chat_handler::<P>))
        .route("/chat/{thread_id}", post(routes::chat::thread_chat_handler::<P>))
        .route("/threads/{thread_id}", get(routes::threads::thread_handler::<P>))
        .route("/tools", get(routes::tools::tools_handler::<P>))
        .route("/api-doc/openapi.json", get(routes::health::openapi_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = origin.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

pub async fn serve<P>(agent: Arc<Agent<P>>, config: &HttpServerConfig) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    let addr = config.bind;
    info!(%addr, "Binding REST server");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve_listener(agent, listener, &config.cors_origins).await
}

/// Serves on an already bound listener.
pub async fn serve_listener<P>(
    agent: Arc<Agent<P>>,
    listener: TcpListener,
    cors_origins: &[String],
) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    let app = build_router(agent, cors_origins);
    info!(
        addr = ?listener.local_addr().ok(),
        "REST server ready to accept connections"
    );
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
