use crate::dtos::{CreateUserRequest, UserResponse};
use crate::extract::JsonBody;
use crate::middleware::Caller;
use crate::models::CreateUser;
use crate::services::metrics::record_error;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use validator::Validate;

/// Register a payer or administrator in the user directory.
pub async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    caller.require_admin()?;
    payload.validate()?;

    let user = state
        .store
        .create_user(&CreateUser::from(payload))
        .await
        .inspect_err(record_error)?;

    tracing::info!(user_id = %user.user_id, role = %user.role, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
