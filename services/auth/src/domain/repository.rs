#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    OauthLink, OneTimeCode, OutboxEvent, PasswordResetToken, RateLimitDecision, Session, User,
};
use crate::error::AuthServiceError;

/// Repository for user identity records.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Insert a user and its OAuth link atomically (same transaction).
    async fn create_with_oauth_link(
        &self,
        user: &User,
        link: &OauthLink,
    ) -> Result<(), AuthServiceError>;

    async fn list_oauth_links(&self, user_id: Uuid) -> Result<Vec<OauthLink>, AuthServiceError>;

    /// Flip the verified flag (registration-OTP success only).
    async fn set_verified(&self, user_id: Uuid) -> Result<(), AuthServiceError>;

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError>;

    /// Delete a user; owned rows cascade. Returns `true` if a row was removed.
    async fn delete(&self, user_id: Uuid) -> Result<bool, AuthServiceError>;
}

/// Repository for one-time verification codes.
pub trait OtpRepository: Send + Sync {
    /// Insert a new code and its email outbox event atomically (same transaction).
    async fn create_with_outbox(
        &self,
        code: &OneTimeCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError>;

    /// All codes for a user, newest first. Expired rows are included so the
    /// verify scan can distinguish an expired match from a mismatch.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OneTimeCode>, AuthServiceError>;

    /// Single-use consumption. Returns `false` when the row is already gone
    /// (a concurrent verification won).
    async fn consume(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    async fn delete_expired(&self) -> Result<u64, AuthServiceError>;
}

/// Repository for password-reset secrets (link tokens and change OTPs).
pub trait ResetTokenRepository: Send + Sync {
    async fn create_with_outbox(
        &self,
        token: &PasswordResetToken,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError>;

    /// Unused, unexpired tokens across all users. Link-token consumption has
    /// no user context before the hash match.
    async fn list_active(&self) -> Result<Vec<PasswordResetToken>, AuthServiceError>;

    /// Unused, unexpired tokens for one user, newest first.
    async fn list_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PasswordResetToken>, AuthServiceError>;

    /// Conditionally mark a token used: the update must only affect a row
    /// whose `used_at` is still null. Returns `false` when a concurrent
    /// consumer won.
    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    async fn delete_expired_or_used(&self) -> Result<u64, AuthServiceError>;
}

/// Repository for opaque sessions.
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), AuthServiceError>;

    /// Find an unexpired session by token.
    async fn find_valid(&self, token: &str) -> Result<Option<Session>, AuthServiceError>;

    /// Returns `true` if a row was removed.
    async fn delete_by_token(&self, token: &str) -> Result<bool, AuthServiceError>;

    async fn delete_expired(&self) -> Result<u64, AuthServiceError>;
}

/// Fixed-window rate limiter keyed by a caller-supplied identifier.
pub trait RateLimiter: Send + Sync {
    /// Atomically count this request against `identifier`'s current window.
    async fn check(
        &self,
        identifier: &str,
        window_secs: u64,
        limit: u64,
    ) -> Result<RateLimitDecision, AuthServiceError>;
}
