use crate::models::AppState;
use crate::AppError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Json, Router};

mod categories;
mod exchange;
mod expenses;
mod reports;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route(
            "/categories/",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}/",
            get(categories::retrieve)
                .put(categories::update)
                .patch(categories::partial_update)
                .delete(categories::destroy),
        )
        .route("/expenses/", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}/",
            get(expenses::retrieve)
                .put(expenses::update)
                .patch(expenses::partial_update)
                .delete(expenses::destroy),
        )
        .route("/reports/summary/", get(reports::summary))
        .route("/integrations/exchange/latest/", get(exchange::latest))
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> crate::Result<T> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Ids that are not integers cannot name a stored row
fn id(path: Result<Path<i64>, PathRejection>) -> crate::Result<i64> {
    path.map(|Path(id)| id).map_err(|_| AppError::NotFound)
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> crate::Result<T> {
    query
        .map(|Query(inner)| inner)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}
