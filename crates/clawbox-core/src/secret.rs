//! Gateway token provisioning.
//!
//! An externally supplied token always passes through unchanged; a secret is
//! never regenerated once it exists. Generation draws 32 bytes from `openssl
//! rand` when available, falling back to OS entropy via `getrandom`. Both
//! sources are cryptographically secure; the choice is availability only.

use crate::CoreError;
use std::process::Command;
use tracing::debug;

const TOKEN_BYTES: usize = 32;

/// Return the supplied token, or generate a fresh one if none is set.
///
/// Empty and whitespace-only inputs count as absent. Fails only when no
/// randomness source at all is available.
pub fn provision_token(existing: Option<&str>) -> Result<String, CoreError> {
    if let Some(token) = existing.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_owned());
    }
    generate()
}

fn generate() -> Result<String, CoreError> {
    if let Some(token) = openssl_token() {
        debug!("gateway token generated via openssl");
        return Ok(token);
    }
    let mut bytes = [0_u8; TOKEN_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| CoreError::NoRandomness(e.to_string()))?;
    debug!("gateway token generated from OS entropy");
    Ok(hex_lower(&bytes))
}

fn openssl_token() -> Option<String> {
    let output = Command::new("openssl")
        .args(["rand", "-hex", "32"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?.trim().to_owned();
    is_hex_token(&token).then_some(token)
}

fn is_hex_token(candidate: &str) -> bool {
    candidate.len() == TOKEN_BYTES * 2
        && candidate
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_token_passes_through_unchanged() {
        let token = provision_token(Some("already-set")).unwrap();
        assert_eq!(token, "already-set");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_from_existing_token() {
        assert_eq!(provision_token(Some("  tok  ")).unwrap(), "tok");
    }

    #[test]
    fn absent_token_is_generated_as_64_lowercase_hex() {
        for absent in [None, Some(""), Some("   ")] {
            let token = provision_token(absent).unwrap();
            assert!(is_hex_token(&token), "not a hex token: {token}");
        }
    }

    #[test]
    fn generated_tokens_differ_between_calls() {
        let a = provision_token(None).unwrap();
        let b = provision_token(None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hex_encoding_is_lowercase_and_zero_padded() {
        assert_eq!(hex_lower(&[0x00, 0x0f, 0xff]), "000fff");
    }

    #[test]
    fn hex_token_validation() {
        assert!(is_hex_token(&"a".repeat(64)));
        assert!(!is_hex_token(&"A".repeat(64)));
        assert!(!is_hex_token(&"a".repeat(63)));
        assert!(!is_hex_token(&"g".repeat(64)));
    }
}
