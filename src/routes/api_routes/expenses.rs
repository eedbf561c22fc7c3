use super::{body, id, query};
use crate::models::{AppState, ExpensePayload, ExpenseQuery};
use crate::Result;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

pub(super) async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let expenses = state.expense_service.list(&query(params)?).await?;
    Ok((StatusCode::OK, Json(expenses)))
}
pub(super) async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let created = state.expense_service.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
pub(super) async fn retrieve(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let expense = state.expense_service.get(id(path)?).await?;
    Ok((StatusCode::OK, Json(expense)))
}
pub(super) async fn update(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = id(path)?;
    let updated = state.expense_service.update(id, body(payload)?).await?;
    Ok((StatusCode::OK, Json(updated)))
}
pub(super) async fn partial_update(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = id(path)?;
    let updated = state
        .expense_service
        .partial_update(id, body(payload)?)
        .await?;
    Ok((StatusCode::OK, Json(updated)))
}
pub(super) async fn destroy(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    state.expense_service.delete(id(path)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
