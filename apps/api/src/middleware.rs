use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use relgate_core::{AppError, PrincipalId};

use crate::error::ApiResult;

/// Header carrying the calling principal's id.
pub const PRINCIPAL_HEADER: &str = "x-principal-id";

/// Principal resolved for the current request. `None` is anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPrincipal(pub Option<PrincipalId>);

pub async fn resolve_principal(mut request: Request, next: Next) -> ApiResult<Response> {
    let principal = principal_from_headers(request.headers())?;
    request.extensions_mut().insert(RequestPrincipal(principal));
    Ok(next.run(request).await)
}

fn principal_from_headers(headers: &HeaderMap) -> Result<Option<PrincipalId>, AppError> {
    let Some(value) = headers.get(PRINCIPAL_HEADER) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| {
        AppError::Unauthorized(format!("{PRINCIPAL_HEADER} header must be visible ASCII"))
    })?;

    value
        .parse::<PrincipalId>()
        .map(Some)
        .map_err(|error| AppError::Unauthorized(error.to_string()))
}
