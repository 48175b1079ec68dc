use crate::error::{AppError, AuthorizationError};
use crate::model::role::Role;
use crate::service::Actor;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Identity attached to the request by [`crate::auth::middleware::auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or(AuthorizationError::Unauthenticated("Missing token").into()),
        )
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthorizationError::NotAdmin.into())
        }
    }

    pub fn actor(&self) -> Actor<'_> {
        Actor {
            user_id: self.user_id,
            username: &self.username,
        }
    }
}
