use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorResponse;
use crate::db::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or incomplete request body; never reaches storage.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_422() {
        let resp = AppError::Validation("missing field `ph`".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn persistence_maps_to_500() {
        let err = AppError::from(StorageError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
