use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identity record as the auth core sees it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Absent for accounts created via OAuth.
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// OAuth provider an account can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OauthProvider {
    Google,
}

impl OauthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Some(Self::Google),
            _ => None,
        }
    }
}

/// Linked OAuth provider record. A user may carry several, one per provider.
#[derive(Debug, Clone)]
pub struct OauthLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: OauthProvider,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// Opaque session grant bound to a user. Expiry is fixed at issuance.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// One-time email verification code. Only the hash is stored.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Single-use password-reset secret (link token or change OTP), stored hashed.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_active(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Outbox event for async email delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Outcome of a fixed-window rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Rows removed by one cleanup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted_otps: u64,
    pub deleted_reset_tokens: u64,
    pub deleted_sessions: u64,
}

/// One-time code length in digits.
pub const OTP_LEN: usize = 6;

/// One-time code time-to-live in seconds (3 minutes).
pub const OTP_TTL_SECS: i64 = 180;

/// Reset-link token length in hex characters (32 bytes of entropy).
pub const RESET_LINK_TOKEN_LEN: usize = 64;

/// Reset-link token time-to-live in seconds (15 minutes).
pub const RESET_LINK_TTL_SECS: i64 = 900;

/// Password-change OTP time-to-live in seconds (10 minutes).
pub const RESET_OTP_TTL_SECS: i64 = 600;

/// Session lifetime in seconds (30 days), fixed at issuance.
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Opaque session token length in characters.
pub const SESSION_TOKEN_LEN: usize = 48;

/// Fixed window applied to verification-OTP requests (limit 1 per email).
pub const OTP_REQUEST_WINDOW_SECS: u64 = 30;
pub const OTP_REQUEST_LIMIT: u64 = 1;

/// Fixed window applied to reset-link requests (limit 1 per email).
pub const RESET_REQUEST_WINDOW_SECS: u64 = 60;
pub const RESET_REQUEST_LIMIT: u64 = 1;
