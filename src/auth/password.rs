use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> String {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing failed")
        .to_string()
}

/// Verify a submitted credential against the stored salted hash.
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("hemligt123");
        assert!(verify_password("hemligt123", &hashed));
        assert!(!verify_password("hemligt124", &hashed));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("hemligt123", "not-a-phc-string"));
        // Plaintext equality must not sneak back in.
        assert!(!verify_password("hemligt123", "hemligt123"));
    }
}
