use super::{body, id};
use crate::models::{AppState, CategoryPayload};
use crate::Result;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

pub(super) async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.category_service.list().await?;
    Ok((StatusCode::OK, Json(categories)))
}
pub(super) async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let created = state.category_service.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
pub(super) async fn retrieve(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let category = state.category_service.get(id(path)?).await?;
    Ok((StatusCode::OK, Json(category)))
}
pub(super) async fn update(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = id(path)?;
    let updated = state.category_service.update(id, body(payload)?).await?;
    Ok((StatusCode::OK, Json(updated)))
}
pub(super) async fn partial_update(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = id(path)?;
    let updated = state
        .category_service
        .partial_update(id, body(payload)?)
        .await?;
    Ok((StatusCode::OK, Json(updated)))
}
pub(super) async fn destroy(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    state.category_service.delete(id(path)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
