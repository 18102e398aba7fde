use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::password_reset::{
    ConsumeResetLinkInput, ConsumeResetLinkUseCase, ConsumeResetOtpInput, ConsumeResetOtpUseCase,
    CreateResetLinkInput, CreateResetLinkUseCase, CreateResetOtpInput, CreateResetOtpUseCase,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_owned(),
    })
}

// ── POST /auth/password/forgot ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = CreateResetLinkUseCase {
        users: state.user_repo(),
        tokens: state.reset_token_repo(),
        limiter: state.rate_limiter(),
        app_url: state.app_url.clone(),
    };
    usecase
        .execute(CreateResetLinkInput { email: body.email })
        .await?;
    Ok(message("password reset email sent"))
}

// ── POST /auth/password/reset ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = ConsumeResetLinkUseCase {
        users: state.user_repo(),
        tokens: state.reset_token_repo(),
    };
    usecase
        .execute(ConsumeResetLinkInput {
            token: body.token,
            new_password: body.new_password,
        })
        .await?;
    Ok(message("password updated"))
}

// ── PATCH /auth/password/reset ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestPasswordOtpRequest {
    pub email: String,
    pub new_password: String,
}

pub async fn request_password_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestPasswordOtpRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = CreateResetOtpUseCase {
        users: state.user_repo(),
        tokens: state.reset_token_repo(),
    };
    usecase
        .execute(CreateResetOtpInput {
            email: body.email,
            new_password: body.new_password,
        })
        .await?;
    Ok(message("otp sent to email"))
}

// ── POST /auth/password/reset/verify ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyPasswordOtpRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

pub async fn verify_password_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyPasswordOtpRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = ConsumeResetOtpUseCase {
        users: state.user_repo(),
        tokens: state.reset_token_repo(),
    };
    usecase
        .execute(ConsumeResetOtpInput {
            email: body.email,
            otp: body.otp,
            new_password: body.new_password,
        })
        .await?;
    Ok(message("password updated"))
}
