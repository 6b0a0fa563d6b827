use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use shared::{
    domain::{Item, ItemId},
    error::{ApiError, ErrorCode},
    protocol::ItemNameRequest,
};
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;

use api::ApiContext;
use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "item server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/items", get(http_list_items).post(http_create_item))
        .route("/items/:item_id", put(http_update_item).delete(http_delete_item))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state.api.storage.health_check().await.map_err(|error| {
        error!(%error, "health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok("ok")
}

async fn http_list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Item>>, HttpError> {
    let items = api::list_items(&state.api).await.map_err(http_error)?;
    Ok(Json(items))
}

async fn http_create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ItemNameRequest>,
) -> Result<(StatusCode, Json<Item>), HttpError> {
    let item = api::create_item(&state.api, &req.name)
        .await
        .map_err(http_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn http_update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    Json(req): Json<ItemNameRequest>,
) -> Result<Json<Item>, HttpError> {
    let item = api::update_item(&state.api, ItemId(item_id), &req.name)
        .await
        .map_err(http_error)?;
    Ok(Json(item))
}

async fn http_delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    api::delete_item(&state.api, ItemId(item_id))
        .await
        .map_err(http_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
