use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::cookie::set_session_cookie;
use crate::domain::types::OauthProvider;
use crate::error::AuthServiceError;
use crate::handlers::session::UserResponse;
use crate::state::AppState;
use crate::usecase::session::{OauthSignInInput, OauthSignInUseCase};

// ── POST /auth/oauth/callback ────────────────────────────────────────────────

/// Provider-asserted profile handed over after the frontend code exchange.
#[derive(Deserialize)]
pub struct OauthCallbackRequest {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<OauthCallbackRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let provider =
        OauthProvider::parse(&body.provider).ok_or(AuthServiceError::UnsupportedProvider)?;

    let usecase = OauthSignInUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
    };
    let out = usecase
        .execute(OauthSignInInput {
            provider,
            subject: body.subject,
            email: body.email,
            name: body.name,
            avatar_url: body.avatar_url,
        })
        .await?;

    let jar = set_session_cookie(jar, out.session.token, state.cookie_domain.clone());
    Ok((StatusCode::OK, jar, Json(UserResponse::from(out.user))))
}
