//! Secret hashing for passwords, one-time codes, and reset tokens.
//!
//! Argon2id with the crate's recommended defaults (19 MiB, 2 iterations),
//! encoded as PHC strings. The same primitive covers every secret the
//! service stores, so a leaked table never yields a usable plaintext.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

/// Hash a plaintext secret and return a PHC-encoded Argon2id hash string.
pub fn hash_secret(secret: &str) -> anyhow::Result<String> {
    // Salt must come from a CSPRNG.
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hash secret: {e}"))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext secret against a PHC-encoded hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
/// malformed or verification itself fails.
pub fn verify_secret(secret: &str, secret_hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(secret_hash).map_err(|e| anyhow::anyhow!("malformed secret hash: {e}"))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("verify secret: {e}")),
    }
}

/// Scan `candidates` for the entry whose stored hash matches `secret`.
///
/// The one matching algorithm behind OTP verification and reset-token
/// consumption: compare against every candidate until a match or exhaustion.
pub fn find_hash_match<'a, T>(
    secret: &str,
    candidates: &'a [T],
    hash_of: impl Fn(&T) -> &str,
) -> anyhow::Result<Option<&'a T>> {
    for candidate in candidates {
        if verify_secret(secret, hash_of(candidate))? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
