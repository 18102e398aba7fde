use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("missing required fields")]
    MissingFields,
    #[error("missing data")]
    MissingData,
    #[error("unsupported provider")]
    UnsupportedProvider,
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("account linked to another sign-in method")]
    AccountLinked,
    #[error("account uses an external sign-in provider")]
    OauthOnlyAccount,
    #[error("invalid credentials")]
    InvalidPassword,
    #[error("invalid otp")]
    InvalidOtp,
    #[error("otp expired")]
    ExpiredOtp,
    #[error("invalid or expired token")]
    InvalidResetToken,
    #[error("session expired")]
    InvalidSession,
    #[error("too many requests")]
    RateLimited { retry_after_secs: u64 },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::MissingData => "MISSING_DATA",
            Self::UnsupportedProvider => "UNSUPPORTED_PROVIDER",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::AccountLinked => "ACCOUNT_LINKED",
            Self::OauthOnlyAccount => "OAUTH_ONLY_ACCOUNT",
            Self::InvalidPassword => "INVALID_CREDENTIALS",
            Self::InvalidOtp => "INVALID_OTP",
            Self::ExpiredOtp => "EXPIRED_OTP",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::InvalidSession => "INVALID_SESSION",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingFields | Self::UnsupportedProvider => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MissingData | Self::ExpiredOtp | Self::InvalidResetToken => {
                StatusCode::BAD_REQUEST
            }
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists | Self::AccountLinked => StatusCode::CONFLICT,
            Self::OauthOnlyAccount
            | Self::InvalidPassword
            | Self::InvalidOtp
            | Self::InvalidSession => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::RateLimited { retry_after_secs } = self {
            body["retry_after"] = serde_json::json!(retry_after_secs);
            let mut response = (status, axum::Json(body)).into_response();
            response.headers_mut().insert(
                header::RETRY_AFTER,
                axum::http::HeaderValue::from(retry_after_secs),
            );
            return response;
        }
        (status, axum::Json(body)).into_response()
    }
}
