//! Bearer-token authentication middleware.
//!
//! Validates the session token from the `Authorization` header and inserts
//! an [`Auth`] context into request extensions for handlers to consume.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Auth};
use crate::errors::auth_error::AuthError;
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header.
fn extract_token(request: &Request) -> Result<String, AuthError> {
    let Some(auth_header) = request.headers().get("authorization") else {
        return Err(AuthError::MissingAuthHeader);
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;
    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Validates the session token and passes the request through with an
/// [`Auth`] extension, or rejects with 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    let token = extract_token(&request)?;
    let auth: Auth = auth::verify_token(&state.config.jwt_secret, &token)?;

    tracing::debug!(
        path = %path,
        user_id = %auth.user_id,
        "session token validated"
    );

    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Method;

    fn request_with_header(value: Option<&str>) -> Request {
        let mut builder = Request::builder().method(Method::POST).uri("/speak");
        if let Some(v) = value {
            builder = builder.header("authorization", v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_bearer() {
        let request = request_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&request).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_missing_header() {
        let request = request_with_header(None);
        assert!(matches!(
            extract_token(&request),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn test_extract_token_wrong_scheme() {
        let request = request_with_header(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            extract_token(&request),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_extract_token_empty_bearer() {
        let request = request_with_header(Some("Bearer "));
        assert!(matches!(
            extract_token(&request),
            Err(AuthError::InvalidAuthHeader)
        ));
    }
}
