use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// `POST /`: single-pass review rendered as a downloadable report.
pub async fn report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let document = state.review.report(body).await?;

    let content_type = HeaderValue::from_static(document.content_type);
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename={}", document.file_name))
            .map_err(ApiError::internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// `POST /answer`: two-phase review returned as an assistant message.
pub async fn answer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let message = state.review.answer(body).await?;
    Ok(Json(message))
}
