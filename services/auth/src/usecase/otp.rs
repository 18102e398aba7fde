use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{OtpRepository, RateLimiter, UserRepository};
use crate::domain::types::{
    OTP_REQUEST_LIMIT, OTP_REQUEST_WINDOW_SECS, OTP_TTL_SECS, OneTimeCode, OutboxEvent,
    RateLimitDecision,
};
use crate::error::AuthServiceError;
use crate::password;

/// Generate a uniformly distributed 6-digit code.
pub(crate) fn generate_otp() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..1_000_000u32).to_string()
}

// ── CreateOtp (issue verification code) ──────────────────────────────────────

pub struct CreateOtpInput {
    pub email: String,
}

pub struct CreateOtpUseCase<U, O, R>
where
    U: UserRepository,
    O: OtpRepository,
    R: RateLimiter,
{
    pub users: U,
    pub otps: O,
    pub limiter: R,
}

impl<U, O, R> CreateOtpUseCase<U, O, R>
where
    U: UserRepository,
    O: OtpRepository,
    R: RateLimiter,
{
    pub async fn execute(&self, input: CreateOtpInput) -> Result<(), AuthServiceError> {
        // 1. Rate limit before touching the store, keyed per action + email.
        let identifier = format!("register-otp:{}", input.email);
        if let RateLimitDecision::Limited { retry_after_secs } = self
            .limiter
            .check(&identifier, OTP_REQUEST_WINDOW_SECS, OTP_REQUEST_LIMIT)
            .await?
        {
            return Err(AuthServiceError::RateLimited { retry_after_secs });
        }

        // 2. Find user by email → 404 if not found
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        // 3. Issue a fresh code. Outstanding codes stay valid until their TTL.
        let otp = generate_otp();
        let now = Utc::now();
        let code = OneTimeCode {
            id: Uuid::new_v4(),
            user_id: user.id,
            code_hash: password::hash_secret(&otp)?,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            created_at: now,
        };

        // 4. Write code + email outbox event in same transaction
        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "otp_email".to_owned(),
            payload: json!({ "email": input.email, "name": user.name, "otp": otp }),
            idempotency_key: format!("otp_email:{}", code.id),
        };

        self.otps.create_with_outbox(&code, &event).await?;
        Ok(())
    }
}

// ── VerifyOtp (consume verification code) ────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
}

pub struct VerifyOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub users: U,
    pub otps: O,
}

impl<U, O> VerifyOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<(), AuthServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let codes = self.otps.list_by_user(user.id).await?;
        let (live, expired): (Vec<_>, Vec<_>) = codes.into_iter().partition(|c| !c.is_expired());

        // Scan every live candidate, not just the newest; several codes may
        // be outstanding at once.
        if let Some(matched) = password::find_hash_match(&input.otp, &live, |c| c.code_hash.as_str())?
        {
            // Single use: the row must still exist when we consume it.
            if !self.otps.consume(matched.id).await? {
                return Err(AuthServiceError::InvalidOtp);
            }
            self.users.set_verified(user.id).await?;
            return Ok(());
        }

        // A correct code past its TTL reports expired, distinct from a mismatch.
        if password::find_hash_match(&input.otp, &expired, |c| c.code_hash.as_str())?.is_some() {
            return Err(AuthServiceError::ExpiredOtp);
        }

        Err(AuthServiceError::InvalidOtp)
    }
}
