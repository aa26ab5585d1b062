//! HFT Exchange Service — WebSocket command/event gateway plus a small
//! REST introspection surface, in front of the `engine` matching core.

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use engine::{Clock, InstrumentRegistry, Matcher};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod exchange;
mod session;
mod transport;
mod types;

use config::{Config, LogFormat};
use exchange::Introspection;
use types::*;

#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    let registry = Arc::new(InstrumentRegistry::new());
    for symbol in &config.preload_instruments {
        registry.preload(symbol);
    }
    let matcher = Arc::new(Matcher::new(registry.clone(), Arc::new(Clock::new())));
    let introspection = Arc::new(Introspection::new(registry));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/symbols", get(list_symbols))
        .route("/symbols/:symbol/depth", get(get_depth))
        .route("/sessions/ws", get(sessions_ws))
        .layer(CorsLayer::permissive())
        .with_state(AppState { matcher, introspection });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();

    info!(bind_addr = %config.bind_addr, "exchange service starting");
    info!("endpoints: GET /health, GET /symbols, GET /symbols/:symbol/depth, WS /sessions/ws");

    axum::serve(listener, app).await.unwrap();
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

#[derive(Clone)]
struct AppState {
    matcher: Arc<Matcher>,
    introspection: Arc<Introspection>,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "service": "hftx-exchange-service" }))
}

async fn list_symbols(State(state): State<AppState>) -> impl IntoResponse {
    Json(SymbolsResponse { symbols: state.introspection.list_symbols() })
}

async fn get_depth(
    Path(symbol): Path<String>,
    Query(params): Query<DepthQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let depth = state
        .introspection
        .market_depth(&symbol, params.levels.unwrap_or(10))
        .ok_or(AppError::SymbolNotFound)?;
    Ok(Json(depth))
}

async fn sessions_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| transport::handle_connection(socket, state.matcher))
}

#[derive(Debug)]
enum AppError {
    SymbolNotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SymbolNotFound => (StatusCode::NOT_FOUND, "symbol not found"),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
