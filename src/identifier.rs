//! Shape checks for the store's opaque identifiers.

use crate::error::ConsoleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const OBJECT_ID_LEN: usize = 24;

/// True when `candidate` is exactly 24 hexadecimal digits
pub fn is_object_id(candidate: &str) -> bool {
    candidate.len() == OBJECT_ID_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Split candidates into (valid, rejected), keeping input order in both.
/// Rejected identifiers are logged, never raised.
pub fn partition_object_ids<S: AsRef<str>>(candidates: &[S]) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        if is_object_id(candidate) {
            valid.push(candidate.to_string());
        } else {
            warn!("Skipping invalid image identifier {:?}", candidate);
            rejected.push(candidate.to_string());
        }
    }

    (valid, rejected)
}

/// Identity of whoever submits rental requests and reviews.
/// Supplied by the caller, there is no session behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequesterId(String);

impl RequesterId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ConsoleError> {
        let raw = raw.into();
        if is_object_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(ConsoleError::InvalidIdentifier(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RequesterId {
    type Error = ConsoleError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<RequesterId> for String {
    fn from(id: RequesterId) -> Self {
        id.0
    }
}

impl std::str::FromStr for RequesterId {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("64f5a53d1234567890abcdef", true)]
    #[case("64F5A53D1234567890ABCDEF", true)]
    #[case("000000000000000000000000", true)]
    #[case("", false)]
    #[case("64f5a53d1234567890abcde", false)]
    #[case("64f5a53d1234567890abcdef0", false)]
    #[case("64f5a53d1234567890abcdeg", false)]
    #[case("64f5a53d-234567890abcdef", false)]
    #[case("ñ4f5a53d1234567890abcde", false)]
    fn test_is_object_id(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_object_id(candidate), expected);
    }

    #[test]
    fn test_partition_keeps_order() {
        let input = [
            "64f5a53d1234567890abcd02",
            "nope",
            "64f5a53d1234567890abcd01",
            "",
        ];
        let (valid, rejected) = partition_object_ids(&input);
        assert_eq!(valid, vec!["64f5a53d1234567890abcd02", "64f5a53d1234567890abcd01"]);
        assert_eq!(rejected, vec!["nope", ""]);
    }

    #[test]
    fn test_partition_empty_input() {
        let empty: [&str; 0] = [];
        let (valid, rejected) = partition_object_ids(&empty);
        assert!(valid.is_empty());
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_requester_id_rejects_bad_shape() {
        assert!(RequesterId::parse("64f5a53d1234567890abcdef").is_ok());
        assert!(matches!(
            "user-1".parse::<RequesterId>(),
            Err(ConsoleError::InvalidIdentifier(_))
        ));
    }
}
