//! PIN storage and failed-attempt tracking.

use aes::Aes256;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::{Duration, NaiveDateTime};
use dashmap::DashMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

type PinEncryptor = cbc::Encryptor<Aes256>;
type PinDecryptor = cbc::Decryptor<Aes256>;

pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 8;
pub const MAX_PIN_ATTEMPTS: u32 = 3;
pub const PIN_LOCKOUT_MINUTES: i64 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinError {
    #[error("PIN must be 4 to 8 digits")]
    InvalidFormat,
    #[error("stored PIN is malformed")]
    Malformed,
    #[error("stored PIN could not be decrypted")]
    Decrypt,
}

/// Whether `pin` is 4 to 8 ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}

/// AES-256-CBC cipher for staff PINs.
///
/// Ciphertexts are stored as `"<iv hex>:<ciphertext hex>"`.
#[derive(Clone)]
pub struct PinCipher {
    key: [u8; 32],
}

impl PinCipher {
    /// Derive the key as the SHA-256 digest of `secret`.
    pub fn new(secret: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Self { key }
    }

    pub fn encrypt(&self, pin: &str) -> Result<String, PinError> {
        if !is_valid_pin(pin) {
            return Err(PinError::InvalidFormat);
        }
        let mut iv = [0u8; 16];
        rand::thread_rng().fill(&mut iv);
        let cipher =
            PinEncryptor::new_from_slices(&self.key, &iv).map_err(|_| PinError::Malformed)?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(pin.as_bytes());
        Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, PinError> {
        let (iv_hex, ciphertext_hex) = stored.split_once(':').ok_or(PinError::Malformed)?;
        let iv = hex::decode(iv_hex).map_err(|_| PinError::Malformed)?;
        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| PinError::Malformed)?;
        if iv.len() != 16 || ciphertext.is_empty() || ciphertext.len() % 16 != 0 {
            return Err(PinError::Malformed);
        }
        let cipher =
            PinDecryptor::new_from_slices(&self.key, &iv).map_err(|_| PinError::Malformed)?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| PinError::Decrypt)?;
        String::from_utf8(plaintext).map_err(|_| PinError::Decrypt)
    }

    /// Compare a stored PIN with a candidate. Undecryptable values never match.
    pub fn matches(&self, stored: &str, candidate: &str) -> bool {
        self.decrypt(stored)
            .map(|pin| pin == candidate)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AttemptState {
    failures: u32,
    locked_until: Option<NaiveDateTime>,
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedAttempt {
    Remaining(u32),
    Locked,
}

/// In-memory failed attempt counter keyed by lock key.
#[derive(Default)]
pub struct PinAttemptTracker {
    attempts: DashMap<String, AttemptState>,
}

impl PinAttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole minutes (rounded up) until `key` unlocks, if it is locked.
    pub fn locked_minutes(&self, key: &str, now: NaiveDateTime) -> Option<i64> {
        let locked_until = self
            .attempts
            .get(key)
            .and_then(|state| state.locked_until)?;
        if locked_until <= now {
            self.attempts.remove(key);
            return None;
        }
        let seconds = (locked_until - now).num_seconds();
        Some((seconds + 59) / 60)
    }

    pub fn record_failure(&self, key: &str, now: NaiveDateTime) -> FailedAttempt {
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        entry.failures += 1;
        if entry.failures >= MAX_PIN_ATTEMPTS {
            entry.locked_until = Some(now + Duration::minutes(PIN_LOCKOUT_MINUTES));
            FailedAttempt::Locked
        } else {
            FailedAttempt::Remaining(MAX_PIN_ATTEMPTS - entry.failures)
        }
    }

    pub fn clear(&self, key: &str) {
        self.attempts.remove(key);
    }
}

pub fn locked_message(minutes: i64) -> String {
    format!("Too many failed attempts. Please try again in {minutes} minutes.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn encrypt_then_decrypt_returns_pin() {
        let cipher = PinCipher::new("secret");
        let stored = cipher.encrypt("482913").unwrap();
        assert!(stored.contains(':'));
        assert_eq!(cipher.decrypt(&stored).unwrap(), "482913");
        assert!(cipher.matches(&stored, "482913"));
        assert!(!cipher.matches(&stored, "000000"));
    }

    #[test]
    fn each_encryption_uses_fresh_iv() {
        let cipher = PinCipher::new("secret");
        assert_ne!(cipher.encrypt("1234").unwrap(), cipher.encrypt("1234").unwrap());
    }

    #[test]
    fn malformed_values_fail_cleanly() {
        let cipher = PinCipher::new("secret");
        assert_eq!(cipher.decrypt("nonsense"), Err(PinError::Malformed));
        assert_eq!(cipher.decrypt("zz:00"), Err(PinError::Malformed));
        assert_eq!(
            cipher.decrypt(&format!("{}:{}", "00".repeat(16), "11".repeat(5))),
            Err(PinError::Malformed)
        );

        let other = PinCipher::new("other").encrypt("1234").unwrap();
        assert!(!cipher.matches(&other, "1234"));
    }

    #[test]
    fn pin_format() {
        assert!(is_valid_pin("1234"));
        assert!(is_valid_pin("12345678"));
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("123456789"));
        assert!(!is_valid_pin("12a4"));
        assert_eq!(PinCipher::new("k").encrypt("12"), Err(PinError::InvalidFormat));
    }

    #[test]
    fn third_failure_locks_for_fifteen_minutes() {
        let tracker = PinAttemptTracker::new();
        assert_eq!(tracker.record_failure("1:2", now()), FailedAttempt::Remaining(2));
        assert_eq!(tracker.record_failure("1:2", now()), FailedAttempt::Remaining(1));
        assert_eq!(tracker.record_failure("1:2", now()), FailedAttempt::Locked);

        assert_eq!(tracker.locked_minutes("1:2", now()), Some(15));
        assert_eq!(
            tracker.locked_minutes("1:2", now() + Duration::seconds(14 * 60 + 1)),
            Some(1)
        );
        assert_eq!(tracker.locked_minutes("1:2", now() + Duration::minutes(15)), None);
        assert_eq!(tracker.locked_minutes("other", now()), None);
    }

    #[test]
    fn clear_resets_failures() {
        let tracker = PinAttemptTracker::new();
        tracker.record_failure("k", now());
        tracker.record_failure("k", now());
        tracker.clear("k");
        assert_eq!(tracker.record_failure("k", now()), FailedAttempt::Remaining(2));
    }
}
