//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Hash a password with Argon2id using OWASP-recommended parameters
/// (memory: 19 MiB, iterations: 2, parallelism: 1). A fresh random
/// salt is generated per call. If a pepper is provided it is
/// prepended to the password before hashing.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("Argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| AuthError::Crypto(format!("Password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns false on mismatch and on a malformed stored digest; the
/// two cases are indistinguishable to callers.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> bool {
    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let Ok(parsed_hash) = argon2::PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default().verify_password(input, &parsed_hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("s3cret-passw0rd", None).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-passw0rd", &hash, None));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("s3cret-passw0rd", None).unwrap();
        assert!(!verify_password("wrong-password", &hash, None));
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("s3cret-passw0rd", Some("pepper")).unwrap();
        assert!(verify_password("s3cret-passw0rd", &hash, Some("pepper")));
        assert!(!verify_password("s3cret-passw0rd", &hash, None));
        assert!(!verify_password("s3cret-passw0rd", &hash, Some("other")));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same-password", None).unwrap();
        let second = hash_password("same-password", None).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_fails_instead_of_erroring() {
        assert!(!verify_password("anything", "not-a-phc-string", None));
        assert!(!verify_password("anything", "", None));
    }
}
