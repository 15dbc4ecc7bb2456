use axum::{
    body::{Body, to_bytes},
    extract::{Query, State},
    http::{HeaderMap, Request, Uri},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppState, error::AppError, token::StudentClaims};

const BODY_LIMIT: usize = 64 * 1024;

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Bearer header first, then the `token` query parameter.
///
/// The middleware also falls back to [`token_from_body`].
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_owned());
    }

    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

/// For handlers that accept the token as a `token` field of a JSON body.
pub fn token_from_body(body: &Value) -> Option<&str> {
    body.get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match extract_token(request.headers(), request.uri()) {
        Some(token) => token,
        None => {
            // Last resort: a `token` field in a JSON body. The body is put back
            // untouched for the handler.
            let (parts, body) = request.into_parts();
            let bytes = to_bytes(body, BODY_LIMIT).await.map_err(|err| {
                tracing::debug!("failed to buffer request body: {}", err);
                AppError::Unauthorized
            })?;
            let token = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .as_ref()
                .and_then(token_from_body)
                .map(str::to_owned);
            request = Request::from_parts(parts, Body::from(bytes));

            token.ok_or_else(|| {
                tracing::debug!("request to {} carries no token", request.uri().path());
                AppError::Unauthorized
            })?
        }
    };

    let payload = state.signer.validate(&token)?;
    let claims: StudentClaims = serde_json::from_value(Value::Object(payload.clone()))
        .map_err(|_| {
            tracing::debug!("token payload has no student identity");
            AppError::Unauthorized
        })?;
    if claims.student_id.is_empty() {
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(payload);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
