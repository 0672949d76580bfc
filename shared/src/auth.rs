use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TOKEN_TTL_DAYS: i64 = 30;

/// Accepts a PIN with optional spaces/dashes; must reduce to exactly 6 digits.
pub fn normalize_pin(raw: &str) -> Result<String> {
    let digits: String = raw.trim().chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 6 {
        return Err(anyhow!("PIN must be exactly 6 digits"));
    }
    Ok(digits)
}

/// PBKDF2-HMAC-SHA256 with a random salt, stored as `hex(salt)$hex(hash)`.
pub fn hash_pin(pin: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), &salt, PBKDF2_ROUNDS, &mut out);
    format!("{}${}", hex::encode(salt), hex::encode(out))
}

pub fn verify_pin(pin: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), &salt, PBKDF2_ROUNDS, &mut out);
    // Constant-time-ish compare; length mismatch already fails.
    expected.len() == HASH_LEN
        && expected
            .iter()
            .zip(out.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_token(user_id: i64, secret: &str) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Whether a one-time code is still open for redemption: never used, and
/// not past its expiry (codes without an expiry never expire). The database
/// claim stays conditional on `used_at IS NULL`, so a concurrent redemption
/// still loses there; this only decides which error the caller reports.
pub fn code_redeemable(
    used_at: Option<chrono::DateTime<Utc>>,
    expires_at: Option<chrono::DateTime<Utc>>,
    now: chrono::DateTime<Utc>,
) -> bool {
    used_at.is_none() && expires_at.map_or(true, |exp| exp > now)
}

/// Random uppercase alphanumeric code for one-time permission/reset codes.
pub fn random_code(len: usize) -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pin_strips_separators() {
        assert_eq!(normalize_pin(" 123-456 ").unwrap(), "123456");
        assert_eq!(normalize_pin("12 34 56").unwrap(), "123456");
    }

    #[test]
    fn normalize_pin_rejects_wrong_length() {
        assert!(normalize_pin("12345").is_err());
        assert!(normalize_pin("1234567").is_err());
        assert!(normalize_pin("").is_err());
        assert!(normalize_pin("abcdef").is_err());
    }

    #[test]
    fn pin_hash_roundtrip() {
        let hash = hash_pin("123456");
        assert!(verify_pin("123456", &hash));
        assert!(!verify_pin("654321", &hash));
    }

    #[test]
    fn pin_hashes_are_salted() {
        assert_ne!(hash_pin("123456"), hash_pin("123456"));
    }

    #[test]
    fn verify_pin_rejects_malformed_stored_value() {
        assert!(!verify_pin("123456", "not-a-hash"));
        assert!(!verify_pin("123456", "zz$zz"));
    }

    #[test]
    fn token_roundtrip() {
        let token = create_token(42, "secret123").unwrap();
        let claims = decode_token(&token, "secret123").unwrap();
        assert_eq!(claims.user_id, 42);
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn one_time_codes_redeem_exactly_once() {
        let now = Utc::now();
        let expiry = Some(now + Duration::minutes(15));

        assert!(code_redeemable(None, expiry, now));
        // Redeemed: a second attempt fails even inside the expiry window.
        assert!(!code_redeemable(Some(now), expiry, now));
    }

    #[test]
    fn one_time_codes_honor_their_expiry() {
        let now = Utc::now();
        assert!(!code_redeemable(None, Some(now - Duration::seconds(1)), now));
        assert!(!code_redeemable(None, Some(now), now));
        // Permission codes carry no expiry and stay open until used.
        assert!(code_redeemable(None, None, now));
    }

    #[test]
    fn random_code_has_requested_length() {
        let code = random_code(12);
        assert_eq!(code.len(), 12);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
