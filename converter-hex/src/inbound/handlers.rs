//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use converter_types::{
    AppError, CatalogSource, ConvertQuery, KeyValueStore, RateSource, RatesQuery,
};

use crate::ConverterService;
use crate::openapi::ApiDoc;
use crate::service::parse_amount;

/// Application state shared across handlers.
pub struct AppState<S, R, C>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    pub service: ConverterService<S, R, C>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let body = serde_json::json!({
            "error": self.0.message(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// List supported currencies.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<S, R, C>(
    State(state): State<Arc<AppState<S, R, C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    let catalog = state.service.list_currencies().await?;
    Ok(Json(catalog))
}

/// Convert an amount into every known currency.
#[tracing::instrument(skip(state), fields(source = %query.from))]
pub async fn convert<S, R, C>(
    State(state): State<Arc<AppState<S, R, C>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    let amount = match query.amount.as_deref() {
        Some(raw) => parse_amount(raw)?,
        None => 1.0,
    };

    let resp = state
        .service
        .get_converted_amounts(&query.from, amount)
        .await?;
    Ok(Json(resp))
}

/// Unscaled cross rates from one source currency.
#[tracing::instrument(skip(state), fields(source = %query.from))]
pub async fn rates<S, R, C>(
    State(state): State<Arc<AppState<S, R, C>>>,
    Query(query): Query<RatesQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    let resp = state.service.rates_for(&query.from).await?;
    Ok(Json(resp))
}

/// Status of the cached pivot table.
pub async fn cache_status<S, R, C>(
    State(state): State<Arc<AppState<S, R, C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: KeyValueStore,
    R: RateSource,
    C: CatalogSource,
{
    let status = state.service.cache_status().await?;
    Ok(Json(status))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
