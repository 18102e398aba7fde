use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::AuthServiceError;
use crate::password;

pub struct RegisterUserInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug)]
pub struct RegisterUserOutput {
    pub email: String,
}

pub struct RegisterUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUserUseCase<U> {
    pub async fn execute(
        &self,
        input: RegisterUserInput,
    ) -> Result<RegisterUserOutput, AuthServiceError> {
        // Validate before touching the store.
        if input.email.trim().is_empty() || input.password.is_empty() || input.name.trim().is_empty()
        {
            return Err(AuthServiceError::MissingFields);
        }

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AuthServiceError::UserAlreadyExists);
        }

        let password_hash = password::hash_secret(&input.password)?;
        let user = User {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            name: input.name,
            password_hash: Some(password_hash),
            avatar_url: input.avatar_url,
            verified: false,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;

        Ok(RegisterUserOutput { email: input.email })
    }
}
