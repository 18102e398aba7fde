use studyio_auth::error::AuthServiceError;
use studyio_auth::password;
use studyio_auth::usecase::register::{RegisterUserInput, RegisterUserUseCase};
use studyio_auth::usecase::session::{LoginInput, LoginUseCase};

use crate::helpers::{MockSessionRepo, MockUserRepo, test_user};

fn alice_input() -> RegisterUserInput {
    RegisterUserInput {
        email: "alice@example.com".to_owned(),
        password: "Secret123!".to_owned(),
        name: "Alice".to_owned(),
        avatar_url: None,
    }
}

#[tokio::test]
async fn should_register_new_user_with_hashed_password() {
    let repo = MockUserRepo::empty();

    let uc = RegisterUserUseCase {
        users: repo.clone(),
    };
    let out = uc.execute(alice_input()).await.unwrap();
    assert_eq!(out.email, "alice@example.com");

    let users = repo.users.lock().unwrap();
    assert_eq!(users.len(), 1);
    let created = &users[0];
    assert_eq!(created.email, "alice@example.com");
    assert!(!created.verified, "new accounts start unverified");
    let hash = created.password_hash.as_ref().expect("password hash stored");
    assert_ne!(hash, "Secret123!", "plaintext must never be stored");
    assert!(password::verify_secret("Secret123!", hash).unwrap());
}

#[tokio::test]
async fn should_reject_duplicate_registration() {
    let repo = MockUserRepo::new(vec![test_user("alice@example.com", "Secret123!")]);

    let uc = RegisterUserUseCase { users: repo };
    let result = uc.execute(alice_input()).await;

    assert!(
        matches!(result, Err(AuthServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_registration_with_missing_fields() {
    let uc = RegisterUserUseCase {
        users: MockUserRepo::empty(),
    };
    let result = uc
        .execute(RegisterUserInput {
            email: "alice@example.com".to_owned(),
            password: String::new(),
            name: "Alice".to_owned(),
            avatar_url: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::MissingFields)),
        "expected MissingFields, got {result:?}"
    );
}

#[tokio::test]
async fn should_login_after_register() {
    let repo = MockUserRepo::empty();
    let register = RegisterUserUseCase {
        users: repo.clone(),
    };
    register.execute(alice_input()).await.unwrap();

    let sessions = MockSessionRepo::empty();
    let login = LoginUseCase {
        users: repo,
        sessions: sessions.clone(),
    };
    let out = login
        .execute(LoginInput {
            email: "alice@example.com".to_owned(),
            password: "Secret123!".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.email, "alice@example.com");
    assert_eq!(
        (out.session.expires_at - out.session.created_at).num_days(),
        30,
        "session expiry is fixed at 30 days"
    );
    assert_eq!(sessions.sessions.lock().unwrap().len(), 1);
}
