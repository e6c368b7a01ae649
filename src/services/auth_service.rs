use tracing::info;

use crate::{
    dao::models::{NewUser, UserEntity},
    error::ServiceError,
    state::SharedState,
};

/// Verify credentials against the backend; wrong credentials are an
/// unauthorized error, not a storage failure.
pub async fn login(
    state: &SharedState,
    email: String,
    password: String,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_portal_store().await?;
    match store.verify_password(email, password).await? {
        Some(user) => {
            info!(user_id = %user.id, "user logged in");
            Ok(user)
        }
        None => Err(ServiceError::Unauthorized("invalid credentials".into())),
    }
}

/// Create a new portal account through the backend registration RPC.
pub async fn register(
    state: &SharedState,
    registration: NewUser,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_portal_store().await?;
    let user = store.register_user(registration).await?;
    info!(user_id = %user.id, "user registered");
    Ok(user)
}
