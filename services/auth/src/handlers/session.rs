use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::cookie::{STUDYIO_SESSION, clear_session_cookie, set_session_cookie};
use crate::domain::repository::SessionRepository;
use crate::domain::types::User;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::{
    DeleteAccountUseCase, LoginInput, LoginUseCase, ValidateSessionUseCase,
};

/// Safe user projection; the password hash never leaves the service.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub verified: bool,
    #[serde(serialize_with = "studyio_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            verified: user.verified,
            created_at: user.created_at,
        }
    }
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.session.token, state.cookie_domain.clone());
    Ok((StatusCode::OK, jar, Json(UserResponse::from(out.user))))
}

// ── GET /auth/session ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    #[serde(serialize_with = "studyio_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn check_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let token = jar
        .get(STUDYIO_SESSION)
        .map(|c| c.value().to_owned())
        .ok_or(AuthServiceError::InvalidSession)?;

    let usecase = ValidateSessionUseCase {
        sessions: state.session_repo(),
    };
    let session = usecase.execute(&token).await?;

    Ok(Json(SessionResponse {
        user_id: session.user_id.to_string(),
        expires_at: session.expires_at,
    }))
}

// ── DELETE /auth/session ─────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    // Revocation is idempotent; a missing row is not an error.
    if let Some(cookie) = jar.get(STUDYIO_SESSION) {
        state.session_repo().delete_by_token(cookie.value()).await?;
    }
    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}

// ── DELETE /auth/account ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub message: String,
}

pub async fn delete_account(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let token = jar
        .get(STUDYIO_SESSION)
        .map(|c| c.value().to_owned())
        .ok_or(AuthServiceError::InvalidSession)?;

    let usecase = DeleteAccountUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
    };
    usecase.execute(&token).await?;

    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    Ok((
        StatusCode::OK,
        jar,
        Json(DeleteAccountResponse {
            message: "account deleted".to_owned(),
        }),
    ))
}
