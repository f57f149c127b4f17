use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use pitchboard_types::api::ActionResponse;
use pitchboard_types::error::ActionError;

pub fn status_for(err: &ActionError) -> StatusCode {
    match err {
        ActionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
        ActionError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ActionError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ActionError::ConfigurationError(_) | ActionError::OperationFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Boundary wrapper: a handler either produced a tagged success envelope or
/// an `ActionError`; either way the wire carries the envelope, never a bare
/// fault.
pub struct ApiResult<T>(pub Result<ActionResponse<T>, ActionError>);

impl<T: Serialize> IntoResponse for ApiResult<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
            Err(err) => {
                let envelope = ActionResponse::<T>::error(&err);
                (status_for(&err), Json(envelope)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(status_for(&ActionError::NotAuthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&ActionError::NotFound("Pitch not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ActionError::PermissionDenied("no".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&ActionError::ValidationError("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ActionError::OperationFailed("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
