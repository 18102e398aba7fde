use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{RateLimiter, ResetTokenRepository, UserRepository};
use crate::domain::types::{
    OutboxEvent, PasswordResetToken, RESET_LINK_TOKEN_LEN, RESET_LINK_TTL_SECS,
    RESET_OTP_TTL_SECS, RESET_REQUEST_LIMIT, RESET_REQUEST_WINDOW_SECS, RateLimitDecision,
};
use crate::error::AuthServiceError;
use crate::password;
use crate::usecase::otp::generate_otp;

/// Charset for reset-link tokens (hex alphabet; 64 chars = 32 bytes of entropy).
const TOKEN_CHARSET: &[u8] = b"0123456789abcdef";

fn generate_link_token() -> String {
    let mut rng = rand::rng();
    (0..RESET_LINK_TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

// ── CreateResetLink (forgot password) ────────────────────────────────────────

pub struct CreateResetLinkInput {
    pub email: String,
}

pub struct CreateResetLinkUseCase<U, T, R>
where
    U: UserRepository,
    T: ResetTokenRepository,
    R: RateLimiter,
{
    pub users: U,
    pub tokens: T,
    pub limiter: R,
    /// Public base URL the reset link is composed against.
    pub app_url: String,
}

impl<U, T, R> CreateResetLinkUseCase<U, T, R>
where
    U: UserRepository,
    T: ResetTokenRepository,
    R: RateLimiter,
{
    pub async fn execute(&self, input: CreateResetLinkInput) -> Result<(), AuthServiceError> {
        if input.email.trim().is_empty() {
            return Err(AuthServiceError::MissingData);
        }

        let identifier = format!("password-reset:{}", input.email);
        if let RateLimitDecision::Limited { retry_after_secs } = self
            .limiter
            .check(&identifier, RESET_REQUEST_WINDOW_SECS, RESET_REQUEST_LIMIT)
            .await?
        {
            return Err(AuthServiceError::RateLimited { retry_after_secs });
        }

        // Unknown emails answer a distinct 404. Product-accepted existence
        // leak; no token row is created.
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let token_value = generate_link_token();
        let now = Utc::now();
        let token = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: password::hash_secret(&token_value)?,
            expires_at: now + Duration::seconds(RESET_LINK_TTL_SECS),
            used_at: None,
            created_at: now,
        };

        // The plaintext token leaves the service only inside the reset link.
        let reset_link = format!("{}/auth/reset-password?token={}", self.app_url, token_value);
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "password_reset_link_email".to_owned(),
            payload: json!({ "email": user.email, "name": user.name, "link": reset_link }),
            idempotency_key: format!("password_reset_link_email:{}", token.id),
        };

        self.tokens.create_with_outbox(&token, &event).await?;
        Ok(())
    }
}

// ── ConsumeResetLink (reset password via emailed link) ───────────────────────

pub struct ConsumeResetLinkInput {
    pub token: String,
    pub new_password: String,
}

pub struct ConsumeResetLinkUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub users: U,
    pub tokens: T,
}

impl<U, T> ConsumeResetLinkUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub async fn execute(&self, input: ConsumeResetLinkInput) -> Result<(), AuthServiceError> {
        if input.token.trim().is_empty() || input.new_password.is_empty() {
            return Err(AuthServiceError::MissingData);
        }

        // Invalid and expired answer identically so the response cannot be
        // used as an existence oracle.
        let candidates = self.tokens.list_active().await?;
        let Some(matched) =
            password::find_hash_match(&input.token, &candidates, |t| t.token_hash.as_str())?
        else {
            return Err(AuthServiceError::InvalidResetToken);
        };

        // Close the double-spend window before touching the password: only
        // the caller whose update flips used_at proceeds.
        if !self.tokens.mark_used(matched.id).await? {
            return Err(AuthServiceError::InvalidResetToken);
        }

        let password_hash = password::hash_secret(&input.new_password)?;
        self.users
            .update_password(matched.user_id, &password_hash)
            .await?;
        Ok(())
    }
}

// ── CreateResetOtp (in-app password change) ──────────────────────────────────

pub struct CreateResetOtpInput {
    pub email: String,
    /// Intent marker from the in-app form; only presence is validated here.
    pub new_password: String,
}

pub struct CreateResetOtpUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub users: U,
    pub tokens: T,
}

impl<U, T> CreateResetOtpUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub async fn execute(&self, input: CreateResetOtpInput) -> Result<(), AuthServiceError> {
        if input.email.trim().is_empty() || input.new_password.is_empty() {
            return Err(AuthServiceError::MissingData);
        }

        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let otp = generate_otp();
        let now = Utc::now();
        let token = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: password::hash_secret(&otp)?,
            expires_at: now + Duration::seconds(RESET_OTP_TTL_SECS),
            used_at: None,
            created_at: now,
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "password_reset_otp_email".to_owned(),
            payload: json!({ "email": user.email, "name": user.name, "otp": otp }),
            idempotency_key: format!("password_reset_otp_email:{}", token.id),
        };

        self.tokens.create_with_outbox(&token, &event).await?;
        Ok(())
    }
}

// ── ConsumeResetOtp ──────────────────────────────────────────────────────────

pub struct ConsumeResetOtpInput {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

pub struct ConsumeResetOtpUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub users: U,
    pub tokens: T,
}

impl<U, T> ConsumeResetOtpUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub async fn execute(&self, input: ConsumeResetOtpInput) -> Result<(), AuthServiceError> {
        if input.email.trim().is_empty() || input.otp.trim().is_empty() || input.new_password.is_empty()
        {
            return Err(AuthServiceError::MissingData);
        }

        // Unknown emails answer the same 400 as a bad code in this flow.
        let Some(user) = self.users.find_by_email(&input.email).await? else {
            return Err(AuthServiceError::InvalidResetToken);
        };

        let candidates = self.tokens.list_active_for_user(user.id).await?;
        let Some(matched) =
            password::find_hash_match(&input.otp, &candidates, |t| t.token_hash.as_str())?
        else {
            return Err(AuthServiceError::InvalidResetToken);
        };

        if !self.tokens.mark_used(matched.id).await? {
            return Err(AuthServiceError::InvalidResetToken);
        }

        let password_hash = password::hash_secret(&input.new_password)?;
        self.users.update_password(user.id, &password_hash).await?;
        Ok(())
    }
}
