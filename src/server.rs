//! HTTP server and API handlers.
//!
//! GET /api/data-types   - list data types.
//! GET /api/csv-files    - list CSV files of a data type.
//! GET /api/csv-columns  - list the header of one CSV file.
//! GET /api/csv-data     - values of one column of one CSV file.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::data::model::CellValue;
use crate::error::{Result, StoreError};
use crate::store::TabularStore;

type SharedStore = Arc<TabularStore>;

/// Build the API router over `store`.
///
/// Every response, errors included, carries the allow-origin, allow-methods
/// and allow-headers CORS headers; `CorsLayer` alone only sends the latter
/// two on preflight.
pub fn router(store: SharedStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    let allow_methods = SetResponseHeaderLayer::if_not_present(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST"),
    );
    let allow_headers = SetResponseHeaderLayer::if_not_present(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/data-types", get(data_types_handler))
        .route("/api/csv-files", get(csv_files_handler))
        .route("/api/csv-columns", get(csv_columns_handler))
        .route("/api/csv-data", get(csv_data_handler))
        .layer(cors)
        .layer(allow_methods)
        .layer(allow_headers)
        .with_state(store)
}

/// Serve the API on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, store: SharedStore) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    log::info!("serving CSV API on http://{addr}");
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("server stopped");
    Ok(())
}

/// Bind `addr` and serve the API.
pub async fn run_server(store: SharedStore, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, store).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

// --- Query parameters ---

type QueryPairs = std::result::Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Decoded query string. A repeated name resolves to its first value.
struct Params(Vec<(String, String)>);

impl Params {
    fn from_query(query: QueryPairs) -> Result<Self> {
        let Query(pairs) = query.map_err(|e| StoreError::InvalidQuery(e.body_text()))?;
        Ok(Params(pairs))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, name: &str) -> Result<&str> {
        self.get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StoreError::BadRequest(name.to_string()))
    }
}

/// The category a request addresses: required by category-aware stores,
/// ignored by flat ones.
fn category<'a>(store: &TabularStore, params: &'a Params) -> Result<Option<&'a str>> {
    if store.uses_categories() {
        params.required("data_type").map(Some)
    } else {
        Ok(None)
    }
}

// --- Handlers ---

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn data_types_handler(State(store): State<SharedStore>) -> Json<Vec<String>> {
    Json(store.list_categories())
}

async fn csv_files_handler(
    State(store): State<SharedStore>,
    query: QueryPairs,
) -> Result<Json<Vec<String>>> {
    let params = Params::from_query(query)?;
    let category = category(&store, &params)?;
    Ok(Json(store.list_resources(category).await?))
}

async fn csv_columns_handler(
    State(store): State<SharedStore>,
    query: QueryPairs,
) -> Result<Json<Vec<String>>> {
    let params = Params::from_query(query)?;
    let category = category(&store, &params)?;
    let filename = params.required("filename")?;
    Ok(Json(store.list_columns(category, filename).await?))
}

async fn csv_data_handler(
    State(store): State<SharedStore>,
    query: QueryPairs,
) -> Result<Json<Vec<CellValue>>> {
    let params = Params::from_query(query)?;
    let category = category(&store, &params)?;
    let filename = params.required("filename")?;
    let column = params.required("column")?;
    Ok(Json(store.get_column_data(category, filename, column).await?))
}

// --- Error responses ---

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::CategoryNotFound(_)
            | StoreError::ResourceNotFound(_)
            | StoreError::ColumnNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::BadRequest(_) | StoreError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            StoreError::MalformedResource { .. } | StoreError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `{"error": ...}` body.
    pub fn public_message(&self) -> String {
        match self {
            StoreError::CategoryNotFound(_) => "Data type not found".to_string(),
            StoreError::ResourceNotFound(_) => "File not found".to_string(),
            StoreError::ColumnNotFound(_) => "Column not found".to_string(),
            StoreError::BadRequest(param) => format!("Missing required parameter: {param}"),
            StoreError::InvalidQuery(reason) => format!("Invalid query string: {reason}"),
            StoreError::MalformedResource { reason, .. } => format!("Malformed CSV file: {reason}"),
            StoreError::Storage(_) => "Storage backend error".to_string(),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        } else {
            log::warn!("request rejected: {self}");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
