use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One user row in the administration listing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListItem {
    pub id: i32,
    pub username: String,
    pub nombre: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserListItem {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            nombre: user.nombre,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Request body for changing a user's role.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRoleRequest {
    /// Name of an existing role.
    #[schema(example = "matrizador")]
    pub role: String,
}

pub fn validate_update_role(payload: &UpdateRoleRequest) -> Result<(), AppError> {
    if payload.role.trim().is_empty() {
        return Err(AppError::Validation("Role must not be empty".into()));
    }
    Ok(())
}
