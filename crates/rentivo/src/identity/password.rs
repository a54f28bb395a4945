use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash `password` with Argon2id and a fresh random salt, returning the PHC string.
pub(crate) fn hash(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// False for a wrong password and for a stored value that is not a PHC string.
pub(crate) fn verify(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_argon2id() {
        let first = hash("hunter2").expect("hashes");
        let second = hash("hunter2").expect("hashes");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify("hunter2", &first));
        assert!(verify("hunter2", &second));
        assert!(!verify("hunter3", &first));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify("hunter2", "not-a-phc-string"));
        assert!(!verify("", ""));
    }
}
