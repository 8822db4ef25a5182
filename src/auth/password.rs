use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

fn argon_failure(stage: &'static str) -> impl FnOnce(password_hash::Error) -> anyhow::Error {
    move |e| {
        error!(error = %e, stage, "argon2 failure");
        anyhow::anyhow!("argon2 {stage}: {e}")
    }
}

/// Argon2id PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(argon_failure("hash"))
}

/// `Ok(false)` on a mismatch. Errors only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(argon_failure("parse"))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(argon_failure("verify")(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_is_salted_argon2id() {
        let first = hash_password("test!1234").unwrap();
        let second = hash_password("test!1234").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("test!1234", &first).unwrap());
        assert!(verify_password("test!1234", &second).unwrap());
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() {
        let hash = hash_password("test!1234").unwrap();
        assert!(!verify_password("inconnu", &hash).unwrap());
    }

    #[test]
    fn unreadable_stored_hash_is_an_error() {
        assert!(verify_password("test!1234", "plain-text").is_err());
    }
}
