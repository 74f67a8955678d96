//! Authentication middleware
//!
//! Admin routes require `Authorization: Bearer <identity token>`. The token is
//! verified by an [`IdentityVerifier`] and its subject must be a registered
//! administrator.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::error::{AppError, ErrorResponse};
use crate::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid token: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Verifies an identity token and yields the subject uid
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// JWT claims structure; `exp` is checked by the validation itself
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// HS256 identity tokens signed with a shared secret
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

/// Authenticated administrator, inserted into request extensions
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub uid: String,
    pub email: String,
}

/// Admin gate: 401 without a valid token, 403 when the subject is not an admin
pub async fn admin_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::from(AuthError::MissingToken).into_response();
    };

    let uid = match state.identity.verify(bearer.token()) {
        Ok(uid) => uid,
        Err(e) => return AppError::from(e).into_response(),
    };

    let admin = match state.admins.find_by_uid(&uid).await {
        Ok(Some(admin)) => admin,
        Ok(None) => {
            tracing::warn!(uid, "Non-admin attempted admin access");
            return AppError::Forbidden.into_response();
        }
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AdminUser {
        uid: admin.uid,
        email: admin.email,
    });
    next.run(request).await
}

/// Extractor for the authenticated administrator
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub AdminUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminUser>()
            .cloned()
            .map(CurrentAdmin)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("UNAUTHORIZED", "Authentication required")),
                )
            })
    }
}
