use crate::domain::repository::{OtpRepository, ResetTokenRepository, SessionRepository};
use crate::domain::types::CleanupReport;
use crate::error::AuthServiceError;

/// Periodic idempotent sweep of expired OTPs, spent or expired reset tokens,
/// and expired sessions. Validation re-checks expiry at use time, so the
/// sweep cadence never affects correctness.
pub struct CleanupUseCase<O, T, S>
where
    O: OtpRepository,
    T: ResetTokenRepository,
    S: SessionRepository,
{
    pub otps: O,
    pub tokens: T,
    pub sessions: S,
}

impl<O, T, S> CleanupUseCase<O, T, S>
where
    O: OtpRepository,
    T: ResetTokenRepository,
    S: SessionRepository,
{
    pub async fn execute(&self) -> Result<CleanupReport, AuthServiceError> {
        let deleted_otps = self.otps.delete_expired().await?;
        let deleted_reset_tokens = self.tokens.delete_expired_or_used().await?;
        let deleted_sessions = self.sessions.delete_expired().await?;
        Ok(CleanupReport {
            deleted_otps,
            deleted_reset_tokens,
            deleted_sessions,
        })
    }
}
