use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::register::{RegisterUserInput, RegisterUserUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthServiceError> {
    let usecase = RegisterUserUseCase {
        users: state.user_repo(),
    };
    let out = usecase
        .execute(RegisterUserInput {
            email: body.email,
            password: body.password,
            name: body.name,
            avatar_url: body.avatar_url,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "account created".to_owned(),
            user: out.email,
        }),
    ))
}
