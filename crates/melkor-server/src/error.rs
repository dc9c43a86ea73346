use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use melkor_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use melkor_core::filter::FilterError;

    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError(AppError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError(AppError::LimitParse("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(AppError::FilterSyntax(FilterError::ColonCount)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(AppError::ProviderError("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
