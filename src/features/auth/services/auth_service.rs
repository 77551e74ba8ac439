use std::sync::Arc;

use lazy_static::lazy_static;
use validator::Validate;

use crate::core::config::{AdminBootstrapConfig, AuthConfig};
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthUserDto, LoginRequestDto, LoginResponseDto, RegisterRequestDto, UserProfileDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::{
    hash_password, hash_password_blocking, verify_password_blocking,
};
use crate::features::auth::services::{SessionService, TokenService};
use crate::features::users::models::{CreateUser, User};
use crate::features::users::UserService;
use crate::shared::validation::{non_empty, validation_error};

lazy_static! {
    /// Verified against when the username is unknown, so a miss costs as much
    /// as a wrong password.
    static ref DUMMY_HASH: String =
        hash_password("not-a-real-password").expect("argon2 accepts default parameters");
}

/// Registration, credential checks, bearer tokens and web sessions
pub struct AuthService {
    users: Arc<UserService>,
    tokens: TokenService,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, pool: sqlx::PgPool, config: &AuthConfig) -> Self {
        Self {
            users,
            tokens: TokenService::new(config),
            sessions: SessionService::new(pool, config.session_ttl),
        }
    }

    /// Validate and store a new account
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<User> {
        let dto = RegisterRequestDto {
            username: dto.username.and_then(non_empty),
            email: dto.email.and_then(non_empty),
            password: dto.password.filter(|p| !p.is_empty()),
            full_name: dto.full_name.and_then(non_empty),
            phone: dto.phone.and_then(non_empty),
        };
        dto.validate().map_err(validation_error)?;

        let (Some(username), Some(email), Some(password), Some(full_name)) =
            (dto.username, dto.email, dto.password, dto.full_name)
        else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        let password_hash = hash_password_blocking(password).await?;

        self.users
            .create(&CreateUser {
                username,
                email,
                password_hash,
                full_name,
                phone: dto.phone,
                is_admin: false,
            })
            .await
    }

    /// Check a username/password pair. `None` covers both an unknown user and a
    /// wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.users.find_by_username(username).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.clone());

        let valid = verify_password_blocking(password.to_string(), stored_hash).await?;

        match user {
            Some(user) if valid => Ok(Some(user)),
            _ => {
                tracing::warn!("Rejected login for username: {}", username);
                Ok(None)
            }
        }
    }

    /// API login: credentials in, bearer token out
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let username = dto.username.and_then(non_empty);
        let password = dto.password.filter(|p| !p.is_empty());

        let (Some(username), Some(password)) = (username, password) else {
            return Err(AppError::BadRequest(
                "Username and password required".to_string(),
            ));
        };

        let user = self
            .authenticate(&username, &password)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let issued = self.tokens.issue(user.id)?;
        tracing::info!("Issued API token for user: {}", user.id);

        Ok(LoginResponseDto {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
            user: AuthUserDto::from(AuthenticatedUser::from(user)),
        })
    }

    /// Resolve a bearer token to its user. A valid token for a deleted user is
    /// treated like any other bad token.
    pub async fn user_from_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.tokens.verify(token)?;

        self.users
            .find_by_id(claims.user_id)
            .await?
            .map(AuthenticatedUser::from)
            .ok_or_else(|| AppError::Unauthorized("Token invalid".to_string()))
    }

    pub async fn start_session(&self, user_id: i64) -> Result<String> {
        self.sessions.create(user_id).await
    }

    pub async fn session_user(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        Ok(self
            .sessions
            .resolve(token)
            .await?
            .map(AuthenticatedUser::from))
    }

    pub async fn end_session(&self, token: &str) -> Result<()> {
        self.sessions.destroy(token).await
    }

    pub async fn current_user(&self, user_id: i64) -> Result<UserProfileDto> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfileDto::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Create the configured admin account unless the username is already taken.
    /// Does nothing when no admin password is configured.
    pub async fn ensure_admin(&self, config: &AdminBootstrapConfig) -> Result<()> {
        let Some(password) = config.password.clone() else {
            tracing::info!("Admin bootstrap skipped (ADMIN_PASSWORD not set)");
            return Ok(());
        };

        if self.users.find_by_username(&config.username).await?.is_some() {
            tracing::info!("Admin account '{}' already exists", config.username);
            return Ok(());
        }

        let password_hash = hash_password_blocking(password).await?;
        let admin = self
            .users
            .create(&CreateUser {
                username: config.username.clone(),
                email: config.email.clone(),
                password_hash,
                full_name: config.full_name.clone(),
                phone: None,
                is_admin: true,
            })
            .await?;

        tracing::info!("Bootstrapped admin account: {} ({})", admin.id, admin.username);
        Ok(())
    }
}
