use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{CreateOtpInput, CreateOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

// ── POST /auth/register/otp ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = CreateOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        limiter: state.rate_limiter(),
    };
    usecase.execute(CreateOtpInput { email: body.email }).await?;
    Ok(StatusCode::OK)
}

// ── POST /auth/register/otp/verify ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
    };
    usecase
        .execute(VerifyOtpInput {
            email: body.email,
            otp: body.otp,
        })
        .await?;
    Ok(StatusCode::OK)
}
