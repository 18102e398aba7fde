use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use studyio_core::health::{healthz, readyz};
use studyio_core::middleware::request_id_layer;

use crate::handlers::{
    cleanup::cleanup,
    oauth::oauth_callback,
    otp::{send_otp, verify_otp},
    password_reset::{forgot_password, request_password_otp, reset_password, verify_password_otp},
    register::register,
    session::{check_session, delete_account, login, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration + email verification
        .route("/auth/register", post(register))
        .route("/auth/register/otp", post(send_otp))
        .route("/auth/register/otp/verify", post(verify_otp))
        // Sessions
        .route("/auth/login", post(login))
        .route("/auth/oauth/callback", post(oauth_callback))
        .route("/auth/session", get(check_session))
        .route("/auth/session", delete(logout))
        .route("/auth/account", delete(delete_account))
        // Password reset
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
        .route("/auth/password/reset", patch(request_password_otp))
        .route("/auth/password/reset/verify", post(verify_password_otp))
        // Maintenance
        .route("/auth/cleanup", post(cleanup))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
