//! Shared service plumbing for Studyio backends.
//!
//! Keeps the auth service free of boilerplate: health endpoints,
//! request-id middleware, tracing setup, and response serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
