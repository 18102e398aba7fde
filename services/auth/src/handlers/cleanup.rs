use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::cleanup::CleanupUseCase;

// ── POST /auth/cleanup ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CleanupResponse {
    pub deleted_otps: u64,
    pub deleted_reset_tokens: u64,
    pub deleted_sessions: u64,
}

pub async fn cleanup(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AuthServiceError> {
    let usecase = CleanupUseCase {
        otps: state.otp_repo(),
        tokens: state.reset_token_repo(),
        sessions: state.session_repo(),
    };
    let report = usecase.execute().await?;
    Ok(Json(CleanupResponse {
        deleted_otps: report.deleted_otps,
        deleted_reset_tokens: report.deleted_reset_tokens,
        deleted_sessions: report.deleted_sessions,
    }))
}
