use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::logging;
use crate::model::{CreateNewsRequest, NewsFilter, NewsKey};

use super::AppState;

/// Failure taxonomy for the CRUD surface. Not-found is a distinct outcome
/// from a server error; validation failures never touch the store.
#[derive(Debug, Error)]
pub(super) enum ApiError {
    #[error("Missing required fields")]
    Validation,
    #[error("News item not found")]
    NotFound,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(err) => {
                logging::error(
                    "api.internal_error",
                    "Request failed against the news store",
                    json!({ "error": format!("{err:?}") }),
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub(super) async fn create_news(
    State(state): State<AppState>,
    Json(body): Json<CreateNewsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.normalized().ok_or(ApiError::Validation)?;
    let record = state.store.insert(request).await?;
    logging::info(
        "api.news.created",
        "News item published",
        json!({ "id": record.id, "category": record.category }),
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": record })),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    category: Option<String>,
    exclude: Option<String>,
    limit: Option<usize>,
}

pub(super) async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = NewsFilter {
        category: params.category,
        // An exclusion that matches neither identifier shape excludes nothing.
        exclude: params.exclude.as_deref().and_then(NewsKey::parse),
        limit: params.limit,
    };
    let records = state.store.find_many(&filter).await;
    Ok(Json(json!({ "success": true, "data": records })))
}

pub(super) async fn fetch_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let key = NewsKey::parse(&id).ok_or(ApiError::NotFound)?;
    let record = state.store.find(&key).await.ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "success": true, "data": record })))
}

pub(super) async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let key = NewsKey::parse(&id).ok_or(ApiError::NotFound)?;
    if !state.store.delete(&key).await? {
        return Err(ApiError::NotFound);
    }
    logging::info("api.news.deleted", "News item deleted", json!({ "id": id }));
    Ok(Json(
        json!({ "success": true, "message": "News item deleted successfully" }),
    ))
}
