use crate::auth::AuthUser;
use crate::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Immutable caller identity for one request.
///
/// Inserted into request extensions by the auth middleware and recovered
/// here, so handlers never reach for ambient state.
#[derive(Clone, Debug)]
pub struct Ctx {
    user: AuthUser,
}

impl Ctx {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::AuthFailCtxNotInRequestExt)
    }
}
