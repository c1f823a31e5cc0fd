//! Password hashing and opaque token generation.
//!
//! Passwords are stored as a salted PBKDF2-HMAC-SHA256 digest. Tokens are
//! 32 random bytes rendered as hex; only their SHA-256 digest is kept.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;
const TOKEN_LEN: usize = 32;
const PBKDF2_ROUNDS: u32 = 100_000;

/// Salted password digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: [u8; SALT_LEN],
    digest: [u8; 32],
}

impl PasswordHash {
    /// Hashes `password` under a fresh random salt.
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            digest: stretch(&salt, password),
            salt,
        }
    }

    /// Checks `password` against the stored digest in constant time.
    pub fn verify(&self, password: &str) -> bool {
        let candidate = stretch(&self.salt, password);
        candidate[..].ct_eq(&self.digest[..]).into()
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

fn stretch(salt: &[u8], password: &str) -> [u8; 32] {
    pbkdf2::pbkdf2_hmac_array::<Sha256, 32>(password.as_bytes(), salt, PBKDF2_ROUNDS)
}

/// Returns a new random token as lowercase hex.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Returns the digest a token is stored under.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
