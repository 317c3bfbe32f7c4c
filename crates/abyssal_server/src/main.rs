use abyssal_core::{init_logging, rank_cells};
use abyssal_data::{CellKey, MergedCellRecord};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;

const DEFAULT_TOP_LIMIT: usize = 10;

/// Read-only view over one merged artifact.
///
/// When the artifact could not be loaded the load error is kept and every
/// data route answers with it.
struct AppState {
    records: Result<Vec<MergedCellRecord>, String>,
    by_key: HashMap<CellKey, usize>,
}

impl AppState {
    fn new(records: Result<Vec<MergedCellRecord>, String>) -> Self {
        let by_key = records
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key(), i))
            .collect();
        Self { records, by_key }
    }

    fn records(&self) -> Result<&[MergedCellRecord], ApiError> {
        self.records
            .as_deref()
            .map_err(|e| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e))
    }
}

/// Every failure is reported as `{"error": "..."}`.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
struct TopParams {
    limit: Option<usize>,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/grid", get(get_grid))
        .route("/api/top", get(get_top))
        .route("/api/cell/:row/:col", get(get_cell))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_logging("abyssal_server=info,tower_http=info");

    let artifact = std::env::var("ABYSSAL_ARTIFACT").unwrap_or_else(|_| "merged.csv".into());
    let records = abyssal_io::load_merged(&artifact)
        .map_err(|e| format!("merged artifact {artifact} is not available: {e}"));
    match &records {
        Ok(records) => {
            tracing::info!(artifact = %artifact, cells = records.len(), "Loaded merged artifact")
        }
        Err(e) => tracing::error!("{}; data routes will report it", e),
    }

    let addr: SocketAddr = match std::env::var("ABYSSAL_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".into())
        .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid ABYSSAL_ADDR: {}", e);
            std::process::exit(1);
        }
    };

    let app = app(Arc::new(AppState::new(records)));

    tracing::info!("Abyssal grid server listening on {}", addr);
    tracing::info!("    Grid API: http://{}/api/grid", addr);
    tracing::info!("    Top API:  http://{}/api/top?limit={}", addr, DEFAULT_TOP_LIMIT);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// REST endpoint: every cell in artifact order
async fn get_grid(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MergedCellRecord>>, ApiError> {
    Ok(Json(state.records()?.to_vec()))
}

/// REST endpoint: best cells first
async fn get_top(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TopParams>, QueryRejection>,
) -> Result<Json<Vec<MergedCellRecord>>, ApiError> {
    let records = state.records()?;
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let ranked = rank_cells(records, limit)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ranked))
}

/// REST endpoint: one cell by (row, col)
async fn get_cell(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(u32, u32)>, PathRejection>,
) -> Result<Json<MergedCellRecord>, ApiError> {
    let records = state.records()?;
    let Path((row, col)) = path?;
    let key = CellKey::new(row, col);
    state
        .by_key
        .get(&key)
        .map(|&i| Json(records[i].clone()))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("cell {key} not found")))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "no such route")
}
