use crate::models::AppState;
use crate::Result;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

pub(super) async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let summary = state.report_service.summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}
