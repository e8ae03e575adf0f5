// src/utils/password.rs
use base64::{engine::general_purpose, Engine as _};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2_sha256";
pub const ITERATIONS: u32 = 100_000;
const SALT_LENGTH: usize = 22;
const KEY_LENGTH: usize = 32;

/// Hashes a raw password into `pbkdf2_sha256${iterations}${salt}${base64 key}`.
pub fn hash_password(raw: &str) -> String {
    hash_with_iterations(raw, ITERATIONS)
}

pub fn hash_with_iterations(raw: &str, iterations: u32) -> String {
    let salt = nanoid::nanoid!(SALT_LENGTH);
    let key = derive(raw, &salt, iterations);
    format!(
        "{}${}${}${}",
        ALGORITHM,
        iterations,
        salt,
        general_purpose::STANDARD.encode(key)
    )
}

/// Checks `raw` against an encoded hash; the iteration count is read back
/// from the hash, so older hashes keep verifying after `ITERATIONS` changes.
pub fn verify_password(raw: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(4, '$');
    let (Some(ALGORITHM), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(expected) = general_purpose::STANDARD.decode(expected) else {
        return false;
    };
    if iterations == 0 || expected.len() != KEY_LENGTH {
        return false;
    }

    constant_time_eq(&derive(raw, salt, iterations), &expected)
}

fn derive(raw: &str, salt: &str, iterations: u32) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(raw.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let encoded = hash_password("admin");
        assert!(encoded.starts_with("pbkdf2_sha256$100000$"));
        assert_eq!(encoded.split('$').count(), 4);
        assert!(verify_password("admin", &encoded));
        assert!(!verify_password("Admin", &encoded));
    }

    #[test]
    fn test_iterations_read_from_hash() {
        let encoded = hash_with_iterations("admin", 1_000);
        assert!(encoded.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("admin", &encoded));
    }

    #[test]
    fn test_known_vector() {
        // RFC 7914 section 11 PBKDF2-HMAC-SHA256 vector, first 32 bytes
        let mut key = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut key);
        assert_eq!(key[..4], [0x55, 0xac, 0x04, 0x6e]);
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_with_iterations("admin", 1_000), hash_with_iterations("admin", 1_000));
    }

    #[test]
    fn test_rejects_unknown_encoding() {
        assert!(!verify_password("admin", "admin"));
        assert!(!verify_password("admin", "md5$salt$digest"));
        assert!(!verify_password("admin", "pbkdf2_sha256$abc$salt$AAAA"));
        assert!(!verify_password("admin", "pbkdf2_sha256$0$salt$AAAA"));
        // Legacy single-round format is no longer accepted
        assert!(!verify_password("admin", "sha256$salt$0123abcd"));
    }
}
