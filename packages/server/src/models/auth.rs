use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "mrios")]
    pub username: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Display name, e.g. "María Ríos".
    #[schema(example = "María Ríos")]
    pub nombre: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    let nombre = payload.nombre.trim();
    if nombre.is_empty() || nombre.chars().count() > 128 {
        return Err(AppError::Validation(
            "Nombre must be 1-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "mrios")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "mrios")]
    pub username: String,
    #[schema(example = "María Ríos")]
    pub nombre: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            nombre: user.nombre,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "mrios")]
    pub username: String,
    #[schema(example = "matrizador")]
    pub role: String,
    #[schema(example = json!(["document:edit"]))]
    pub permissions: Vec<String>,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "mrios")]
    pub username: String,
    #[schema(example = "matrizador")]
    pub role: String,
    #[schema(example = json!(["document:edit"]))]
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(username: &str, password: &str, nombre: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            nombre: nombre.into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_register_request(&req("mrios", "longenough", "María Ríos")).is_ok());
    }

    #[test]
    fn rejects_bad_usernames_and_passwords() {
        assert!(validate_register_request(&req("no spaces", "longenough", "X Y")).is_err());
        assert!(validate_register_request(&req("ok_name", "short", "X Y")).is_err());
        assert!(validate_register_request(&req("", "longenough", "X Y")).is_err());
        assert!(validate_register_request(&req("ok_name", "longenough", " ")).is_err());
    }
}
