use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use studyio_auth_schema::{
    oauth_accounts, one_time_codes, outbox_events, password_reset_tokens, sessions, users,
};

use crate::domain::repository::{
    OtpRepository, ResetTokenRepository, SessionRepository, UserRepository,
};
use crate::domain::types::{
    OauthLink, OauthProvider, OneTimeCode, OutboxEvent, PasswordResetToken, Session, User,
};
use crate::error::AuthServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        insert_user(&self.db, user).await.context("create user")?;
        Ok(())
    }

    async fn create_with_oauth_link(
        &self,
        user: &User,
        link: &OauthLink,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let user = user.clone();
                let link = link.clone();
                Box::pin(async move {
                    insert_user(txn, &user).await?;
                    oauth_accounts::ActiveModel {
                        id: Set(link.id),
                        user_id: Set(link.user_id),
                        provider: Set(link.provider.as_str().to_owned()),
                        subject: Set(link.subject.clone()),
                        created_at: Set(link.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create user with oauth link")?;
        Ok(())
    }

    async fn list_oauth_links(&self, user_id: Uuid) -> Result<Vec<OauthLink>, AuthServiceError> {
        let models = oauth_accounts::Entity::find()
            .filter(oauth_accounts::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list oauth links")?;
        models.into_iter().map(oauth_link_from_model).collect()
    }

    async fn set_verified(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user_id),
            verified: Set(true),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user verified")?;
        Ok(())
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user_id),
            password_hash: Set(Some(password_hash.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user password")?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, AuthServiceError> {
        let result = users::Entity::delete_by_id(user_id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_user<C: ConnectionTrait>(conn: &C, user: &User) -> Result<(), sea_orm::DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        name: Set(user.name.clone()),
        password_hash: Set(user.password_hash.clone()),
        avatar_url: Set(user.avatar_url.clone()),
        verified: Set(user.verified),
        created_at: Set(user.created_at),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        password_hash: model.password_hash,
        avatar_url: model.avatar_url,
        verified: model.verified,
        created_at: model.created_at,
    }
}

fn oauth_link_from_model(model: oauth_accounts::Model) -> Result<OauthLink, AuthServiceError> {
    let provider = OauthProvider::parse(&model.provider).ok_or_else(|| {
        AuthServiceError::Internal(anyhow::anyhow!(
            "unknown oauth provider in store: {}",
            model.provider
        ))
    })?;
    Ok(OauthLink {
        id: model.id,
        user_id: model.user_id,
        provider,
        subject: model.subject,
        created_at: model.created_at,
    })
}

// ── One-time code repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn create_with_outbox(
        &self,
        code: &OneTimeCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                let event = event.clone();
                Box::pin(async move {
                    one_time_codes::ActiveModel {
                        id: Set(code.id),
                        user_id: Set(code.user_id),
                        code_hash: Set(code.code_hash.clone()),
                        expires_at: Set(code.expires_at),
                        created_at: Set(code.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create one-time code with outbox")?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OneTimeCode>, AuthServiceError> {
        let models = one_time_codes::Entity::find()
            .filter(one_time_codes::Column::UserId.eq(user_id))
            .order_by_desc(one_time_codes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list one-time codes")?;
        Ok(models.into_iter().map(otp_from_model).collect())
    }

    async fn consume(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let result = one_time_codes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("consume one-time code")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let result = one_time_codes::Entity::delete_many()
            .filter(one_time_codes::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .context("delete expired one-time codes")?;
        Ok(result.rows_affected)
    }
}

fn otp_from_model(model: one_time_codes::Model) -> OneTimeCode {
    OneTimeCode {
        id: model.id,
        user_id: model.user_id,
        code_hash: model.code_hash,
        expires_at: model.expires_at,
        created_at: model.created_at,
    }
}

// ── Password-reset token repository ───────────────────────────────────────────

#[derive(Clone)]
pub struct DbResetTokenRepository {
    pub db: DatabaseConnection,
}

impl ResetTokenRepository for DbResetTokenRepository {
    async fn create_with_outbox(
        &self,
        token: &PasswordResetToken,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let token = token.clone();
                let event = event.clone();
                Box::pin(async move {
                    password_reset_tokens::ActiveModel {
                        id: Set(token.id),
                        user_id: Set(token.user_id),
                        token_hash: Set(token.token_hash.clone()),
                        expires_at: Set(token.expires_at),
                        used_at: Set(None),
                        created_at: Set(token.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create reset token with outbox")?;
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<PasswordResetToken>, AuthServiceError> {
        let now = Utc::now();
        let models = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .filter(password_reset_tokens::Column::ExpiresAt.gt(now))
            .order_by_desc(password_reset_tokens::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list active reset tokens")?;
        Ok(models.into_iter().map(reset_token_from_model).collect())
    }

    async fn list_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PasswordResetToken>, AuthServiceError> {
        let now = Utc::now();
        let models = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::UserId.eq(user_id))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .filter(password_reset_tokens::Column::ExpiresAt.gt(now))
            .order_by_desc(password_reset_tokens::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list active reset tokens for user")?;
        Ok(models.into_iter().map(reset_token_from_model).collect())
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        // Conditional update: only a row whose used_at is still null flips.
        // rows_affected == 0 means a concurrent consumer won the race.
        let now = Utc::now();
        let result = password_reset_tokens::Entity::update_many()
            .col_expr(password_reset_tokens::Column::UsedAt, Expr::value(now))
            .filter(password_reset_tokens::Column::Id.eq(id))
            .filter(password_reset_tokens::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("mark reset token used")?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_expired_or_used(&self) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let result = password_reset_tokens::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(password_reset_tokens::Column::ExpiresAt.lt(now))
                    .add(password_reset_tokens::Column::UsedAt.is_not_null()),
            )
            .exec(&self.db)
            .await
            .context("delete expired or used reset tokens")?;
        Ok(result.rows_affected)
    }
}

fn reset_token_from_model(model: password_reset_tokens::Model) -> PasswordResetToken {
    PasswordResetToken {
        id: model.id,
        user_id: model.user_id,
        token_hash: model.token_hash,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}

// ── Session repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), AuthServiceError> {
        sessions::ActiveModel {
            token: Set(session.token.clone()),
            user_id: Set(session.user_id),
            expires_at: Set(session.expires_at),
            created_at: Set(session.created_at),
        }
        .insert(&self.db)
        .await
        .context("create session")?;
        Ok(())
    }

    async fn find_valid(&self, token: &str) -> Result<Option<Session>, AuthServiceError> {
        let now = Utc::now();
        let model = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .filter(sessions::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find valid session")?;
        Ok(model.map(session_from_model))
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, AuthServiceError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .context("delete session")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .context("delete expired sessions")?;
        Ok(result.rows_affected)
    }
}

fn session_from_model(model: sessions::Model) -> Session {
    Session {
        token: model.token,
        user_id: model.user_id,
        expires_at: model.expires_at,
        created_at: model.created_at,
    }
}

// ── Shared outbox insert ──────────────────────────────────────────────────────

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}
