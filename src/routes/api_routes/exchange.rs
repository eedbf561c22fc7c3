use super::query;
use crate::models::AppState;
use crate::Result;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde::Deserialize;

#[derive(Deserialize)]
pub(super) struct ExchangeQuery {
    base: Option<String>,
}

pub(super) async fn latest(
    State(state): State<AppState>,
    params: std::result::Result<Query<ExchangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let params = query(params)?;
    let rates = state
        .currency_service
        .latest(params.base.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(rates)))
}
