use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use contracts::system::auth::TokenClaims;

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates the bearer token, applies `allowed` to its claims and stores
/// them in the request extensions for [`super::extractor::CurrentUser`]
async fn authorize(
    mut req: Request<Body>,
    next: Next,
    allowed: fn(&TokenClaims) -> bool,
) -> Result<Response, StatusCode> {
    let token = bearer_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = super::jwt::validate_token(token).map_err(|e| {
        tracing::debug!("Rejected token: {:#}", e);
        StatusCode::UNAUTHORIZED
    })?;

    if !allowed(&claims) {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Any authenticated user
pub async fn require_auth(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    authorize(req, next, |_| true).await
}

/// Sellers and admins
pub async fn require_seller(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    authorize(req, next, TokenClaims::can_sell).await
}

pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    authorize(req, next, TokenClaims::is_admin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
