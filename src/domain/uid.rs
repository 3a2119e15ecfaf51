//! Metadata identifiers
//!
//! UID Format: 11 characters, the first an ASCII letter, the remaining ten
//! ASCII letters or digits (e.g., `bjDvmb4bfuf`).
//!
//! Generated UIDs are derived from a seed plus the creation timestamp, so the
//! same seed generated twice at different instants produces different UIDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of every UID
pub const UID_LENGTH: usize = 11;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error, PartialEq)]
pub enum UidError {
    #[error("Invalid UID: expected 11 characters, got {1} in '{0}'")]
    InvalidLength(String, usize),

    #[error("Invalid UID: '{0}' must start with a letter")]
    InvalidFirstChar(String),

    #[error("Invalid UID: '{0}' may only contain letters and digits")]
    InvalidChars(String),
}

/// An 11-character metadata identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Generates a UID from a seed and timestamp
    pub fn generate(seed: &str, timestamp: DateTime<Utc>) -> Self {
        let input = format!("{}{}", seed, timestamp.timestamp_nanos_opt().unwrap_or(0));
        let hash = blake3::hash(input.as_bytes());
        let bytes = hash.as_bytes();

        let mut uid = String::with_capacity(UID_LENGTH);
        uid.push(LETTERS[bytes[0] as usize % LETTERS.len()] as char);
        for byte in &bytes[1..UID_LENGTH] {
            uid.push(ALPHANUMERIC[*byte as usize % ALPHANUMERIC.len()] as char);
        }

        Self(uid)
    }

    /// Generates a UID seeded with the current time
    pub fn generate_now(seed: &str) -> Self {
        Self::generate(seed, Utc::now())
    }

    /// Returns the UID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the string is a well-formed UID
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Uid>().is_ok()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uid {
    type Err = UidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let len = s.chars().count();
        if len != UID_LENGTH {
            return Err(UidError::InvalidLength(s.to_string(), len));
        }

        if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(UidError::InvalidFirstChar(s.to_string()));
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UidError::InvalidChars(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Uid {
    type Error = UidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for Uid {
    type Error = UidError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_uid_is_well_formed() {
        let uid = Uid::generate("Sex", Utc::now());
        let s = uid.to_string();

        assert_eq!(s.len(), UID_LENGTH);
        assert!(s.chars().next().unwrap().is_ascii_alphabetic());
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(Uid::is_valid(&s));
    }

    #[test]
    fn generation_is_unique_for_different_timestamps() {
        let ts1 = Utc::now();
        let ts2 = ts1 + chrono::Duration::nanoseconds(1);

        assert_ne!(Uid::generate("Age", ts1), Uid::generate("Age", ts2));
    }

    #[test]
    fn generation_is_stable_for_same_input() {
        let ts = Utc::now();
        assert_eq!(Uid::generate("Age", ts), Uid::generate("Age", ts));
    }

    #[test]
    fn parses_known_uids() {
        let uid: Uid = "bjDvmb4bfuf".parse().unwrap();
        assert_eq!(uid.as_str(), "bjDvmb4bfuf");

        let padded: Uid = "  HllvX50cXC0 ".parse().unwrap();
        assert_eq!(padded.as_str(), "HllvX50cXC0");
    }

    #[test]
    fn rejects_invalid_uids() {
        assert_eq!(
            "short".parse::<Uid>(),
            Err(UidError::InvalidLength("short".to_string(), 5))
        );
        assert_eq!(
            "1jDvmb4bfuf".parse::<Uid>(),
            Err(UidError::InvalidFirstChar("1jDvmb4bfuf".to_string()))
        );
        assert_eq!(
            "bjDvmb4-fuf".parse::<Uid>(),
            Err(UidError::InvalidChars("bjDvmb4-fuf".to_string()))
        );
    }

    #[test]
    fn serde_uses_plain_string() {
        let uid: Uid = "xYerKDKCefk".parse().unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"xYerKDKCefk\"");

        let parsed: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, uid);

        assert!(serde_json::from_str::<Uid>("\"not-a-uid\"").is_err());
    }
}
