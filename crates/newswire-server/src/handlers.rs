//! Route handlers and HTTP error mapping

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use newswire_core::{HealthReport, NewswireError, SearchRequest, SearchResponse};
use serde::Serialize;

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = state.service.search(&request).await?;
    Ok(Json(response))
}

/// `GET /search/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health().await)
}

/// JSON error body: `{ "error": { "code": "...", "message": "..." } }`
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

/// Error wrapper that maps engine errors onto HTTP status codes
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<String>,
    retry_after_secs: Option<u64>,
}

impl From<NewswireError> for ApiError {
    fn from(err: NewswireError) -> Self {
        match err {
            NewswireError::InvalidQuery(_) | NewswireError::EmptyInput => ApiError {
                status: StatusCode::BAD_REQUEST,
                code: "invalid_query",
                message: err.to_string(),
                field: None,
                retry_after_secs: None,
            },
            NewswireError::Validation { field, ref message } => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "validation",
                message: message.clone(),
                field: Some(field.to_string()),
                retry_after_secs: None,
            },
            NewswireError::EmbeddingUnavailable(_) => ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "embedding_unavailable",
                message: err.to_string(),
                field: None,
                retry_after_secs: Some(2),
            },
            NewswireError::IndexStale(_) => ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "index_stale",
                message: err.to_string(),
                field: None,
                retry_after_secs: Some(5),
            },
            other => {
                // Full detail stays in the logs; clients get a generic 500.
                tracing::error!(error = %other, "search request failed");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal",
                    message: "internal server error".to_string(),
                    field: None,
                    retry_after_secs: None,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
                field: self.field,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
