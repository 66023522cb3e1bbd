//! The 128-bit content digest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a digest in bytes
pub const DIGEST_LEN: usize = 16;

/// An MD5 digest of a file's content
///
/// Rendered as 32 lowercase hex characters. Ordering follows the byte
/// values, which matches the ordering of the hex strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Digest of an in-memory buffer
    pub fn of(data: &[u8]) -> Self {
        Self(md5::compute(data).0)
    }

    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Get the digest as a lowercase hexadecimal string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl From<md5::Digest> for Digest {
    fn from(digest: md5::Digest) -> Self {
        Self(digest.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Error returned when a string is not a 32 character hex digest
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid digest {0:?}: expected 32 hexadecimal characters")]
pub struct ParseDigestError(String);

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_LEN * 2 || !s.is_ascii() {
            return Err(ParseDigestError(s.to_string()));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseDigestError(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for Digest {
    type Error = ParseDigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_of_hello() {
        assert_eq!(
            Digest::of(b"hello").to_hex(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn empty_input_has_a_digest() {
        assert_eq!(Digest::of(b"").to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn hex_parses_back() {
        let digest = Digest::of(b"world");
        let parsed: Digest = digest.to_hex().parse().unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let parsed: Digest = "5D41402ABC4B2A76B9719D911017C592".parse().unwrap();
        assert_eq!(parsed, Digest::of(b"hello"));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!("abc".parse::<Digest>().is_err());
        assert!("zz41402abc4b2a76b9719d911017c592".parse::<Digest>().is_err());
        assert!("5d41402abc4b2a76b9719d911017c5é".parse::<Digest>().is_err());
    }

    #[test]
    fn ordering_matches_hex_ordering() {
        let mut digests = vec![Digest::of(b"a"), Digest::of(b"b"), Digest::of(b"c")];
        let mut hexes: Vec<String> = digests.iter().map(Digest::to_hex).collect();
        digests.sort();
        hexes.sort();
        let sorted: Vec<String> = digests.iter().map(Digest::to_hex).collect();
        assert_eq!(sorted, hexes);
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Digest::of(b"hello")).unwrap();
        assert_eq!(json, "\"5d41402abc4b2a76b9719d911017c592\"");
    }
}
