//! Authentication and registration service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    access::Caller,
    config::AuthConfig,
    error::{AppError, AppResult},
    media::MediaUrls,
    models::user::{CreateUser, LoginRequest, LoginResponse, UserClaims, UserDetail, UserRow},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    media: MediaUrls,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, media: MediaUrls) -> Self {
        Self { repository, config, media }
    }

    /// Check credentials and issue a token
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let invalid = || AppError::Authentication("Unable to log in with provided credentials.".to_string());

        let user = self
            .repository
            .users
            .get_by_username(request.username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&user.password_hash, &request.password)? {
            tracing::warn!(username = %user.username, "Failed login attempt");
            return Err(invalid());
        }

        let auth_token = self.issue_token(&user)?;
        self.repository.users.touch_last_login(user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginResponse { auth_token })
    }

    /// Register a new account
    pub async fn register(&self, request: CreateUser) -> AppResult<UserDetail> {
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        let user = self.repository.users.create(&request, &password_hash).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        Ok(UserDetail::render(&user, &self.media))
    }

    /// Full profile of the calling user
    pub async fn me(&self, caller: Caller) -> AppResult<UserDetail> {
        let user_id = caller.require_user()?;
        let user = self.repository.users.get_by_id(user_id).await?;
        Ok(UserDetail::render(&user, &self.media))
    }

    fn issue_token(&self, user: &UserRow) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp: now + (self.config.token_expiration_hours as i64 * 3600),
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
