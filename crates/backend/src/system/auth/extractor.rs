use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use contracts::system::auth::TokenClaims;

use crate::shared::error::ApiError;

/// Caller identity for handlers behind `require_auth`.
///
/// Reads the claims the middleware stored in the request extensions and
/// answers 401 with the usual JSON error body when they are missing.
pub struct CurrentUser(pub TokenClaims);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.sub
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<TokenClaims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => Err(ApiError::Unauthorized("Authentication required".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use contracts::system::users::UserRole;

    fn parts_with(claims: Option<TokenClaims>) -> Parts {
        let mut request = Request::builder().uri("/api/cart").body(()).unwrap();
        if let Some(claims) = claims {
            request.extensions_mut().insert(claims);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_reads_claims_from_extensions() {
        let claims = TokenClaims {
            sub: "u-42".into(),
            email: "buyer@example.com".into(),
            role: UserRole::Customer,
            exp: 0,
            iat: 0,
        };
        let mut parts = parts_with(Some(claims));
        let user = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id(), "u-42");
        assert_eq!(user.0.email, "buyer@example.com");
    }

    #[tokio::test]
    async fn test_missing_claims_is_unauthorized() {
        let mut parts = parts_with(None);
        let Err(err) = CurrentUser::from_request_parts(&mut parts, &()).await else {
            panic!("extractor accepted a request without claims");
        };
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
