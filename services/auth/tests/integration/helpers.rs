use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use studyio_auth::domain::repository::{
    OtpRepository, RateLimiter, ResetTokenRepository, SessionRepository, UserRepository,
};
use studyio_auth::domain::types::{
    OauthLink, OauthProvider, OneTimeCode, OutboxEvent, PasswordResetToken, RateLimitDecision,
    Session, User,
};
use studyio_auth::error::AuthServiceError;
use studyio_auth::password;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub links: Arc<Mutex<Vec<OauthLink>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            links: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn with_links(users: Vec<User>, links: Vec<OauthLink>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            links: Arc::new(Mutex::new(links)),
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn create_with_oauth_link(
        &self,
        user: &User,
        link: &OauthLink,
    ) -> Result<(), AuthServiceError> {
        self.users.lock().unwrap().push(user.clone());
        self.links.lock().unwrap().push(link.clone());
        Ok(())
    }

    async fn list_oauth_links(&self, user_id: Uuid) -> Result<Vec<OauthLink>, AuthServiceError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_verified(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user_id)
        {
            user.verified = true;
        }
        Ok(())
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == user_id)
        {
            user.password_hash = Some(password_hash.to_owned());
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != user_id);
        self.links.lock().unwrap().retain(|l| l.user_id != user_id);
        Ok(users.len() < before)
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockOtpRepo {
    pub codes: Arc<Mutex<Vec<OneTimeCode>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
}

impl MockOtpRepo {
    pub fn new(codes: Vec<OneTimeCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
            events: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl OtpRepository for MockOtpRepo {
    async fn create_with_outbox(
        &self,
        code: &OneTimeCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.codes.lock().unwrap().push(code.clone());
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OneTimeCode>, AuthServiceError> {
        let mut codes: Vec<_> = self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(codes)
    }

    async fn consume(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| c.id != id);
        Ok(codes.len() < before)
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| !c.is_expired());
        Ok((before - codes.len()) as u64)
    }
}

// ── MockResetTokenRepo ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockResetTokenRepo {
    pub tokens: Arc<Mutex<Vec<PasswordResetToken>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
}

impl MockResetTokenRepo {
    pub fn new(tokens: Vec<PasswordResetToken>) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
            events: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl ResetTokenRepository for MockResetTokenRepo {
    async fn create_with_outbox(
        &self,
        token: &PasswordResetToken,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.tokens.lock().unwrap().push(token.clone());
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<PasswordResetToken>, AuthServiceError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_active())
            .cloned()
            .collect())
    }

    async fn list_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PasswordResetToken>, AuthServiceError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id && t.is_active())
            .cloned()
            .collect())
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id && t.used_at.is_none()) {
            Some(token) => {
                token.used_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired_or_used(&self) -> Result<u64, AuthServiceError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.is_active());
        Ok((before - tokens.len()) as u64)
    }
}

// ── MockSessionRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSessionRepo {
    pub sessions: Arc<Mutex<Vec<Session>>>,
}

impl MockSessionRepo {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl SessionRepository for MockSessionRepo {
    async fn create(&self, session: &Session) -> Result<(), AuthServiceError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn find_valid(&self, token: &str) -> Result<Option<Session>, AuthServiceError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token == token && s.is_valid())
            .cloned())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, AuthServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.token != token);
        Ok(sessions.len() < before)
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.is_valid());
        Ok((before - sessions.len()) as u64)
    }
}

// ── Rate limiters ────────────────────────────────────────────────────────────

/// Limiter that never limits, for tests exercising other paths.
#[derive(Clone)]
pub struct AllowAllRateLimiter;

impl RateLimiter for AllowAllRateLimiter {
    async fn check(
        &self,
        _identifier: &str,
        _window_secs: u64,
        _limit: u64,
    ) -> Result<RateLimitDecision, AuthServiceError> {
        Ok(RateLimitDecision::Allowed)
    }
}

/// In-memory fixed window mirroring the Redis limiter's semantics.
#[derive(Clone, Default)]
pub struct MemoryRateLimiter {
    windows: Arc<Mutex<HashMap<String, (u64, Instant)>>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimiter for MemoryRateLimiter {
    async fn check(
        &self,
        identifier: &str,
        window_secs: u64,
        limit: u64,
    ) -> Result<RateLimitDecision, AuthServiceError> {
        let mut windows = self.windows.lock().unwrap();
        let now = Instant::now();
        let entry = windows.entry(identifier.to_owned()).or_insert((0, now));
        if now.duration_since(entry.1).as_secs() >= window_secs {
            *entry = (0, now);
        }
        entry.0 += 1;
        if entry.0 > limit {
            let elapsed = now.duration_since(entry.1).as_secs();
            return Ok(RateLimitDecision::Limited {
                retry_after_secs: window_secs.saturating_sub(elapsed),
            });
        }
        Ok(RateLimitDecision::Allowed)
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(email: &str, password: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        name: "Alice".to_owned(),
        password_hash: Some(password::hash_secret(password).unwrap()),
        avatar_url: None,
        verified: false,
        created_at: Utc::now(),
    }
}

pub fn oauth_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        name: "Alice".to_owned(),
        password_hash: None,
        avatar_url: Some("https://cdn.example.com/avatar.png".to_owned()),
        verified: true,
        created_at: Utc::now(),
    }
}

pub fn oauth_link(user_id: Uuid) -> OauthLink {
    OauthLink {
        id: Uuid::new_v4(),
        user_id,
        provider: OauthProvider::Google,
        subject: "google-subject-1".to_owned(),
        created_at: Utc::now(),
    }
}

pub fn hashed_code(user_id: Uuid, otp: &str, ttl_secs: i64) -> OneTimeCode {
    let now = Utc::now();
    OneTimeCode {
        id: Uuid::new_v4(),
        user_id,
        code_hash: password::hash_secret(otp).unwrap(),
        expires_at: now + chrono::Duration::seconds(ttl_secs),
        created_at: now,
    }
}

pub fn hashed_reset_token(user_id: Uuid, secret: &str, ttl_secs: i64) -> PasswordResetToken {
    let now = Utc::now();
    PasswordResetToken {
        id: Uuid::new_v4(),
        user_id,
        token_hash: password::hash_secret(secret).unwrap(),
        expires_at: now + chrono::Duration::seconds(ttl_secs),
        used_at: None,
        created_at: now,
    }
}

pub fn test_session(user_id: Uuid, ttl_secs: i64) -> Session {
    let now = Utc::now();
    Session {
        token: format!("tok-{}", Uuid::new_v4()),
        user_id,
        expires_at: now + chrono::Duration::seconds(ttl_secs),
        created_at: now,
    }
}
