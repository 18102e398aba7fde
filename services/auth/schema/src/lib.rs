//! sea-orm entity models for the auth service database.

pub mod oauth_accounts;
pub mod one_time_codes;
pub mod outbox_events;
pub mod password_reset_tokens;
pub mod sessions;
pub mod users;
