//! Salted admin password hashing.
//!
//! Stored format: `<salt>$<hex digest>` where the digest is a BLAKE3 derive-key hash
//! of `salt || password`. Verification compares `blake3::Hash` values, which is
//! constant-time.

use uuid::Uuid;

const KDF_CONTEXT: &str = "agency-api 2024-01-01 admin password v1";

pub const MIN_PASSWORD_LEN: usize = 10;

fn digest(salt: &str, password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize()
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{salt}${}", digest(&salt, password).to_hex())
}

/// Returns true when `password` matches `stored`. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, hex)) = stored.split_once('$') else {
        return false;
    };
    match blake3::Hash::from_hex(hex) {
        Ok(expected) => digest(salt, password) == expected,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_correct_password_only() {
        let stored = hash_password("correct horse battery");
        assert!(verify_password("correct horse battery", &stored));
        assert!(!verify_password("correct horse batterY", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password here");
        let b = hash_password("same password here");
        assert_ne!(a, b);
        assert!(verify_password("same password here", &a));
        assert!(verify_password("same password here", &b));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "no-separator"));
        assert!(!verify_password("anything", "salt$nothex"));
        assert!(!verify_password("anything", ""));
    }
}
