use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::types::{
    OauthLink, OauthProvider, SESSION_TOKEN_LEN, SESSION_TTL_SECS, Session, User,
};
use crate::error::AuthServiceError;
use crate::password;

/// Charset for opaque session tokens.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn generate_session_token() -> String {
    let mut rng = rand::rng();
    (0..SESSION_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Expiry is fixed here at issuance and never silently extended.
fn issue_session(user_id: Uuid) -> Session {
    let now = Utc::now();
    Session {
        token: generate_session_token(),
        user_id,
        expires_at: now + Duration::seconds(SESSION_TTL_SECS),
        created_at: now,
    }
}

// ── Login (credentials) ──────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub session: Session,
}

pub struct LoginUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
}

impl<U: UserRepository, S: SessionRepository> LoginUseCase<U, S> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthServiceError::MissingFields);
        }

        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        // Accounts created via OAuth carry no password hash; credentials
        // sign-in points back at the original provider.
        let Some(ref password_hash) = user.password_hash else {
            return Err(AuthServiceError::OauthOnlyAccount);
        };

        if !password::verify_secret(&input.password, password_hash)? {
            return Err(AuthServiceError::InvalidPassword);
        }

        let session = issue_session(user.id);
        self.sessions.create(&session).await?;

        Ok(LoginOutput { user, session })
    }
}

// ── OAuth sign-in ────────────────────────────────────────────────────────────

pub struct OauthSignInInput {
    pub provider: OauthProvider,
    pub subject: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug)]
pub struct OauthSignInOutput {
    pub user: User,
    pub session: Session,
}

pub struct OauthSignInUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
}

impl<U: UserRepository, S: SessionRepository> OauthSignInUseCase<U, S> {
    pub async fn execute(
        &self,
        input: OauthSignInInput,
    ) -> Result<OauthSignInOutput, AuthServiceError> {
        if input.email.trim().is_empty() || input.subject.trim().is_empty() {
            return Err(AuthServiceError::MissingFields);
        }

        let user = match self.users.find_by_email(&input.email).await? {
            Some(existing) => {
                // Never merge identities: an email that already owns a
                // password-based account, or is linked to a different
                // provider, rejects this sign-in.
                if existing.password_hash.is_some() {
                    return Err(AuthServiceError::AccountLinked);
                }
                let links = self.users.list_oauth_links(existing.id).await?;
                if !links.iter().any(|l| l.provider == input.provider) {
                    return Err(AuthServiceError::AccountLinked);
                }
                existing
            }
            None => {
                // Provider-asserted email: the account starts verified.
                let now = Utc::now();
                let user = User {
                    id: Uuid::new_v4(),
                    email: input.email.clone(),
                    name: input.name,
                    password_hash: None,
                    avatar_url: input.avatar_url,
                    verified: true,
                    created_at: now,
                };
                let link = OauthLink {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    provider: input.provider,
                    subject: input.subject,
                    created_at: now,
                };
                self.users.create_with_oauth_link(&user, &link).await?;
                user
            }
        };

        let session = issue_session(user.id);
        self.sessions.create(&session).await?;

        Ok(OauthSignInOutput { user, session })
    }
}

// ── Session validation ───────────────────────────────────────────────────────

pub struct ValidateSessionUseCase<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> ValidateSessionUseCase<S> {
    /// Expiry is re-checked at lookup; sweep cadence never matters here.
    pub async fn execute(&self, token: &str) -> Result<Session, AuthServiceError> {
        self.sessions
            .find_valid(token)
            .await?
            .ok_or(AuthServiceError::InvalidSession)
    }
}

// ── Account deletion ─────────────────────────────────────────────────────────

pub struct DeleteAccountUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
}

impl<U: UserRepository, S: SessionRepository> DeleteAccountUseCase<U, S> {
    pub async fn execute(&self, session_token: &str) -> Result<(), AuthServiceError> {
        let session = self
            .sessions
            .find_valid(session_token)
            .await?
            .ok_or(AuthServiceError::InvalidSession)?;

        // Owned rows (sessions, codes, reset tokens, links) cascade with the user.
        if !self.users.delete(session.user_id).await? {
            return Err(AuthServiceError::UserNotFound);
        }
        Ok(())
    }
}
