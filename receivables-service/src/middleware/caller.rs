//! Caller identity extractor.
//!
//! The gateway authenticates users and forwards their identity in
//! `X-User-ID` and `X-User-Role`. This service trusts those headers and only
//! decides what the caller may see or change.

use crate::models::{Role, Transaction};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject anyone who is not an administrator.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Administrator role required"
            )))
        }
    }

    /// Payer to restrict listings to: everyone for admins, self for customers.
    pub fn visible_payer(&self) -> Option<Uuid> {
        match self.role {
            Role::Admin => None,
            Role::Customer => Some(self.user_id),
        }
    }

    /// Customers may only look at their own transactions.
    pub fn ensure_can_view(&self, transaction: &Transaction) -> Result<(), AppError> {
        match self.visible_payer() {
            Some(payer_id) if payer_id != transaction.payer_id => Err(AppError::Forbidden(
                anyhow::anyhow!("Transaction belongs to another customer"),
            )),
            _ => Ok(()),
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Missing {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)?;
        let user_id = Uuid::parse_str(user_id).map_err(|_| {
            AppError::AuthError(anyhow::anyhow!("{} is not a valid UUID", USER_ID_HEADER))
        })?;

        let role = header(parts, USER_ROLE_HEADER)?;
        let role = Role::parse(role).ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!("Unknown role '{}'", role))
        })?;

        let span = tracing::Span::current();
        span.record("user_id", tracing::field::display(user_id));
        span.record("role", role.as_str());

        Ok(Caller { user_id, role })
    }
}
