use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::User;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for user registration
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        required,
        length(min = 3, max = 80, message = "Username must be 3-80 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: Option<String>,

    #[validate(required, email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(
        required,
        length(min = 1, max = 128, message = "Password must be 1-128 characters")
    )]
    pub password: Option<String>,

    #[validate(
        required,
        length(min = 1, max = 100, message = "Full name must be 1-100 characters")
    )]
    pub full_name: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

/// Response DTO for registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponseDto {
    pub message: String,
    pub user_id: i64,
}

/// Request DTO for user login. Both fields are checked by the handler so a
/// missing one yields a single message.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response DTO for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    /// Bearer token, valid for 24 hours by default
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiry instant
    pub expires_at: DateTime<Utc>,
    pub user: AuthUserDto,
}

/// User info included in the login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<AuthenticatedUser> for AuthUserDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// Public profile of the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfileDto {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterRequestDto {
        RegisterRequestDto {
            username: Some("river_watch".to_string()),
            email: Some("river@example.com".to_string()),
            password: Some("s3cret".to_string()),
            full_name: Some("River Watcher".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let errors = RegisterRequestDto::default().validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["username", "email", "password", "full_name"] {
            assert!(fields.contains_key(field), "{} not reported", field);
        }
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn test_username_format_is_enforced() {
        let mut dto = valid();
        dto.username = Some("9lives".to_string());
        assert!(dto.validate().is_err());

        dto.username = Some("ab".to_string());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_email_format_is_enforced() {
        let mut dto = valid();
        dto.email = Some("not-an-email".to_string());
        assert!(dto.validate().is_err());
    }
}
