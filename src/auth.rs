//! Bearer-token authentication
//!
//! The user service issues HS256 JWTs with the whole user object embedded
//! in the payload. This service only verifies; it never signs and never
//! stores credentials. The verified user is trusted as-is, with no
//! existence check against the user directory.

use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// User object embedded in the token payload by the user service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user: Option<AuthUser>,
    pub exp: usize,
}

/// Verify a raw token against the shared secret and extract the embedded
/// user. Pure; no side effects.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<AuthUser> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map_err(|_| Error::AuthFailInvalidToken)?;

    data.claims.user.ok_or(Error::AuthFailInvalidToken)
}

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let auth_header = req.headers().get(header::AUTHORIZATION);
    let auth_header = match auth_header {
        Some(h) => h.to_str().map_err(|_| Error::AuthFailTokenWrongFormat)?,
        None => return Err(Error::AuthFailNoToken),
    };

    // Format: "Bearer <token>"
    if !auth_header.starts_with("Bearer ") {
        return Err(Error::AuthFailTokenWrongFormat);
    }

    let token = &auth_header[7..];
    let user = verify_token(token, state.config.jwt_secret.as_bytes())?;

    // Store Ctx in request extensions
    req.extensions_mut().insert(Ctx::new(user));

    Ok(next.run(req).await)
}
