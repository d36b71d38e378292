//! 거래 행/상세 조회 API

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::invoice::{InvoiceSummary, TaxPolicy};
use crate::presenter::SectionFilter;
use crate::record::{RecordError, TradeRepository};
use crate::row::{rows_for_user, SectionCounts, TradeRow};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TradeRepository>,
    pub policy: TaxPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Record(e) => {
                tracing::error!("Repository error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub viewer: String,
}

#[derive(Debug, Serialize)]
pub struct TradeDetail {
    pub row: TradeRow,
    pub invoice: InvoiceSummary,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users/:user_id/trades", get(list_trades))
        .route("/users/:user_id/trades/counts", get(section_counts))
        .route("/trades/:id", get(trade_detail))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_trades(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TradeRow>>, ApiError> {
    let filter = match query.section.as_deref() {
        Some(raw) => raw.parse::<SectionFilter>().map_err(ApiError::BadRequest)?,
        None => SectionFilter::All,
    };

    let trades = state.repo.list_for_user(&user_id).await?;
    Ok(Json(rows_for_user(&trades, &user_id, filter, &state.policy)))
}

async fn section_counts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SectionCounts>, ApiError> {
    let trades = state.repo.list_for_user(&user_id).await?;
    let rows = rows_for_user(&trades, &user_id, SectionFilter::All, &state.policy);
    Ok(Json(SectionCounts::from_rows(&rows)))
}

async fn trade_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<TradeDetail>, ApiError> {
    let trade = state
        .repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("trade {}", id)))?;

    // 당사자가 아니면 존재 여부도 노출하지 않음
    let row = TradeRow::build(&trade, &query.viewer, &state.policy)
        .ok_or_else(|| ApiError::NotFound(format!("trade {}", id)))?;

    Ok(Json(TradeDetail {
        row,
        invoice: InvoiceSummary::for_trade(&trade, &state.policy),
    }))
}
