//! Random token and code generation plus reset-token hashing.

use rand::{thread_rng, Rng, RngCore};
use sha2::{Digest, Sha256};

/// Generates `bytes` random bytes, hex-encoded (output is `2 * bytes` chars).
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Generates a 6-digit verification code, uniform in [100000, 999999].
pub fn generate_verification_code() -> String {
    thread_rng().gen_range(100_000..=999_999).to_string()
}

/// SHA-256 of the input, hex-encoded. Reset tokens are stored only in
/// this form; the plaintext goes out once in the reset email.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_hex_of_requested_length() {
        let token = generate_token(20);
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_token(20), token);
    }

    #[test]
    fn verification_codes_are_six_decimal_digits() {
        for _ in 0..100 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let value: u32 = code.parse().expect("numeric");
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn sha256_hex_is_deterministic() {
        let a = sha256_hex("reset-token");
        let b = sha256_hex("reset-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(sha256_hex("other-token"), a);
    }
}
