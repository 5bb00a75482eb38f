// ============================================================================
// Invoice Core - Authentication Service
// File: crates/invoice-core/src/services/auth_service.rs
// ============================================================================
//! Registration, login and password reset flows

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};
use validator::Validate;

use invoice_security::{JwtService, PasswordService, ResetTokenHasher, SessionIdentity};
use invoice_shared::utils::{mask_email, normalize_email};

use crate::domain::{PublicUser, User};
use crate::error::DomainError;
use crate::ports::{Mailer, OutgoingMail};
use crate::repositories::UserRepository;

const RESET_MAIL_SUBJECT: &str = "Password Reset Request";

#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct ForgotPasswordInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Validate)]
pub struct ResetPasswordInput {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub reset_token_ttl: Duration,
    /// Web client base URL; reset links point at `<frontend_url>/reset-password`.
    pub frontend_url: String,
}

/// Result of successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub user: PublicUser,
}

/// Authentication service for handling the account lifecycle
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    tokens: Arc<JwtService>,
    reset_tokens: ResetTokenHasher,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        tokens: Arc<JwtService>,
        reset_tokens: ResetTokenHasher,
        settings: AuthSettings,
    ) -> Self {
        Self {
            user_repo,
            mailer,
            tokens,
            reset_tokens,
            settings,
        }
    }

    /// Register a new user
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser, DomainError> {
        input.validate()?;
        let email = normalize_email(&input.email);
        info!("Registration attempt for email: {}", mask_email(&email));

        // 1. Check if email already exists
        if self.user_repo.find_by_email(&email).await?.is_some() {
            warn!("Registration failed: email already exists: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        // 2. Hash password
        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        // 3. Save; the store's unique index settles concurrent registrations
        let user = User::new(input.name, email, password_hash);
        let created = self.user_repo.create(&user).await?;

        info!("Registration successful for user: {}", created.id);
        Ok(created.public())
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = normalize_email(email);
        info!("Login attempt for email: {}", mask_email(&email));

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: email not found: {}", mask_email(&email));
                DomainError::UserNotFound
            })?;

        let password_valid = PasswordService::verify(password, &user.password_hash).map_err(|e| {
            error!("Stored password hash unreadable for user {}: {}", user.id, e);
            DomainError::PasswordHashError(e.to_string())
        })?;

        if !password_valid {
            warn!("Login failed: invalid password for user: {}", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&SessionIdentity {
                id: user.id.to_string(),
                name: user.name.clone(),
                email: user.email.clone(),
            })
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        info!("Login successful for user: {}", user.id);
        Ok(LoginResult {
            token,
            user: user.public(),
        })
    }

    /// Issue a reset token and email the reset link
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> Result<(), DomainError> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Password reset requested for unknown email: {}", mask_email(&email));
                DomainError::UserNotFound
            })?;

        // Only the hash is persisted; the plaintext leaves in the email.
        let issued = self.reset_tokens.issue();
        let expires_at = Utc::now() + self.settings.reset_token_ttl;
        self.user_repo
            .set_reset_token(&user.id, &issued.hash, expires_at)
            .await?;

        let reset_url = format!(
            "{}/reset-password?token={}",
            self.settings.frontend_url.trim_end_matches('/'),
            issued.plaintext
        );
        let mail = OutgoingMail {
            to: user.email.clone(),
            subject: RESET_MAIL_SUBJECT.to_string(),
            html_body: format!(
                "<p>You requested a password reset. Click the link below to reset your password:</p>\n\
                 <a href=\"{url}\">{url}</a>",
                url = reset_url
            ),
        };

        self.mailer.send(mail).await.map_err(|e| {
            error!("Failed to send reset email for user {}: {}", user.id, e);
            e
        })?;

        info!("Password reset email dispatched for user: {}", user.id);
        Ok(())
    }

    /// Consume a reset token and set a new password
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), DomainError> {
        input.validate()?;

        let token_hash = self.reset_tokens.hash(&input.token);
        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        let user = self
            .user_repo
            .consume_reset_token(&token_hash, &password_hash, Utc::now())
            .await?
            .ok_or_else(|| {
                warn!("Password reset rejected: invalid or expired token");
                DomainError::InvalidResetToken
            })?;

        info!("Password reset completed for user: {}", user.id);
        Ok(())
    }
}
