use crate::error::ErrorResponse;
use axum::http::header::CONTENT_LENGTH;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use stormlead_core::Config;

/// Whether error bodies may carry `details` and `error_type`
#[derive(Clone, Copy, Debug)]
pub struct ErrorDetailPolicy {
    pub expose_details: bool,
}

impl ErrorDetailPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            expose_details: !config.is_production(),
        }
    }
}

/// Error detail middleware
/// Re-renders error bodies without their diagnostic fields when the policy hides them.
pub async fn error_detail_middleware(
    State(policy): State<ErrorDetailPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if policy.expose_details {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    match parts.extensions.remove::<ErrorResponse>() {
        Some(mut error) if error.details.is_some() || error.error_type.is_some() => {
            error.details = None;
            error.error_type = None;
            parts.headers.remove(CONTENT_LENGTH);
            (parts, Json(error)).into_response()
        }
        _ => Response::from_parts(parts, body),
    }
}
