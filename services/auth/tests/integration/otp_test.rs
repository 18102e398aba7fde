use chrono::Utc;

use studyio_auth::domain::types::OTP_LEN;
use studyio_auth::error::AuthServiceError;
use studyio_auth::password;
use studyio_auth::usecase::otp::{
    CreateOtpInput, CreateOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

use crate::helpers::{
    AllowAllRateLimiter, MemoryRateLimiter, MockOtpRepo, MockUserRepo, hashed_code, test_user,
};

#[tokio::test]
async fn should_issue_hashed_otp_with_outbox_event() {
    let user = test_user("alice@example.com", "Secret123!");
    let otp_repo = MockOtpRepo::empty();

    let uc = CreateOtpUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        otps: otp_repo.clone(),
        limiter: AllowAllRateLimiter,
    };
    uc.execute(CreateOtpInput {
        email: user.email.clone(),
    })
    .await
    .unwrap();

    let codes = otp_repo.codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    let code = &codes[0];
    assert_eq!(code.user_id, user.id);
    assert_eq!(
        (code.expires_at - code.created_at).num_seconds(),
        180,
        "codes expire 3 minutes after issuance"
    );

    let events = otp_repo.events.lock().unwrap();
    assert_eq!(events.len(), 1, "exactly one email event per issued code");
    let event = &events[0];
    assert_eq!(event.kind, "otp_email");
    assert_eq!(event.payload["email"], "alice@example.com");

    let otp = event.payload["otp"].as_str().unwrap().to_owned();
    assert_eq!(otp.len(), OTP_LEN);
    assert!(otp.chars().all(|c| c.is_ascii_digit()));
    assert_ne!(code.code_hash, otp, "only the hash is persisted");
    assert!(password::verify_secret(&otp, &code.code_hash).unwrap());
}

#[tokio::test]
async fn should_reject_otp_issue_for_unknown_user() {
    let uc = CreateOtpUseCase {
        users: MockUserRepo::empty(),
        otps: MockOtpRepo::empty(),
        limiter: AllowAllRateLimiter,
    };
    let result = uc
        .execute(CreateOtpInput {
            email: "nobody@example.com".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_rate_limit_second_otp_request_in_window() {
    let user = test_user("alice@example.com", "Secret123!");
    let uc = CreateOtpUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        otps: MockOtpRepo::empty(),
        limiter: MemoryRateLimiter::new(),
    };

    uc.execute(CreateOtpInput {
        email: user.email.clone(),
    })
    .await
    .expect("first request in the window passes");

    let result = uc
        .execute(CreateOtpInput {
            email: user.email.clone(),
        })
        .await;
    match result {
        Err(AuthServiceError::RateLimited { retry_after_secs }) => {
            assert!(retry_after_secs <= 30, "retry-after bounded by the window");
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn should_verify_otp_and_mark_user_verified() {
    let user = test_user("alice@example.com", "Secret123!");
    let user_repo = MockUserRepo::new(vec![user.clone()]);
    let otp_repo = MockOtpRepo::new(vec![hashed_code(user.id, "482913", 180)]);

    let uc = VerifyOtpUseCase {
        users: user_repo.clone(),
        otps: otp_repo.clone(),
    };
    uc.execute(VerifyOtpInput {
        email: user.email.clone(),
        otp: "482913".to_owned(),
    })
    .await
    .unwrap();

    assert!(
        user_repo.users.lock().unwrap()[0].verified,
        "successful verification flips the verified flag"
    );
    assert!(
        otp_repo.codes.lock().unwrap().is_empty(),
        "the matched code is deleted on success"
    );
}

#[tokio::test]
async fn should_reject_replayed_otp() {
    let user = test_user("alice@example.com", "Secret123!");
    let user_repo = MockUserRepo::new(vec![user.clone()]);
    let otp_repo = MockOtpRepo::new(vec![hashed_code(user.id, "482913", 180)]);

    let uc = VerifyOtpUseCase {
        users: user_repo,
        otps: otp_repo,
    };
    let input = || VerifyOtpInput {
        email: "alice@example.com".to_owned(),
        otp: "482913".to_owned(),
    };

    uc.execute(input()).await.unwrap();
    let replay = uc.execute(input()).await;

    assert!(
        matches!(replay, Err(AuthServiceError::InvalidOtp)),
        "a consumed code never validates again, got {replay:?}"
    );
}

#[tokio::test]
async fn should_report_expired_for_correct_code_past_ttl() {
    let user = test_user("alice@example.com", "Secret123!");
    let user_repo = MockUserRepo::new(vec![user.clone()]);
    let otp_repo = MockOtpRepo::new(vec![hashed_code(user.id, "482913", -10)]);

    let uc = VerifyOtpUseCase {
        users: user_repo.clone(),
        otps: otp_repo,
    };
    let result = uc
        .execute(VerifyOtpInput {
            email: user.email.clone(),
            otp: "482913".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::ExpiredOtp)),
        "expected ExpiredOtp, got {result:?}"
    );
    assert!(
        !user_repo.users.lock().unwrap()[0].verified,
        "an expired match must not verify the user"
    );
}

#[tokio::test]
async fn should_reject_wrong_code() {
    let user = test_user("alice@example.com", "Secret123!");
    let uc = VerifyOtpUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        otps: MockOtpRepo::new(vec![hashed_code(user.id, "482913", 180)]),
    };
    let result = uc
        .execute(VerifyOtpInput {
            email: user.email.clone(),
            otp: "111111".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidOtp)),
        "expected InvalidOtp, got {result:?}"
    );
}

#[tokio::test]
async fn should_scan_all_outstanding_codes_not_just_newest() {
    let user = test_user("alice@example.com", "Secret123!");
    let older = hashed_code(user.id, "111111", 180);
    let mut newer = hashed_code(user.id, "482913", 180);
    newer.created_at = older.created_at + chrono::Duration::seconds(5);

    let otp_repo = MockOtpRepo::new(vec![older, newer]);
    let uc = VerifyOtpUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        otps: otp_repo.clone(),
    };

    // The older outstanding code still verifies until its own TTL.
    uc.execute(VerifyOtpInput {
        email: user.email.clone(),
        otp: "111111".to_owned(),
    })
    .await
    .unwrap();

    let remaining = otp_repo.codes.lock().unwrap();
    assert_eq!(remaining.len(), 1, "only the matched code is consumed");
    assert!(remaining[0].expires_at > Utc::now());
}
