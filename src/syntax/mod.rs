//! Structural address checks and `local@domain` decomposition.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("address pattern compiles")
});

/// Returns `true` when `address` matches the accepted address shape:
/// one `@`, a local part of `[a-zA-Z0-9._%+-]`, and a domain whose last
/// label is an alphabetic token of at least two letters.
pub fn validate(address: &str) -> bool {
    if address.is_empty() || !address.contains('@') {
        return false;
    }
    EMAIL_PATTERN.is_match(address)
}

/// A lower-cased address split on its single `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub email: String,
    pub local_part: String,
    pub domain: String,
}

impl Address {
    /// Normalise `raw` (trim + lower-case) and split it. Returns `None` when the
    /// input has no `@`, more than one, or an empty side.
    pub fn parse(raw: &str) -> Option<Self> {
        let email = raw.trim().to_lowercase();
        let (local, domain) = email.split_once('@')?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return None;
        }
        Some(Self {
            local_part: local.to_string(),
            domain: domain.to_string(),
            email: email.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic() {
        assert!(validate("alice@example.com"));
        assert!(validate("first.last+tag@mail.example.co.uk"));
        assert!(validate("a_b%c-d@sub-domain.example.io"));
    }

    #[test]
    fn rejects_missing_at_and_empty() {
        assert!(!validate(""));
        assert!(!validate("alice.example.com"));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(!validate("a@@example.com"));
        assert!(!validate("a b@example.com"));
        assert!(!validate("alice@example"));
        assert!(!validate("alice@example.c"));
        assert!(!validate("alice@example.c0m"));
        assert!(!validate("al!ce@example.com"));
    }

    #[test]
    fn parse_lowercases_and_splits() {
        let addr = Address::parse("  Admin@Example.COM ").expect("parses");
        assert_eq!(addr.email, "admin@example.com");
        assert_eq!(addr.local_part, "admin");
        assert_eq!(addr.domain, "example.com");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Address::parse("nobody").is_none());
        assert!(Address::parse("@example.com").is_none());
        assert!(Address::parse("user@").is_none());
        assert!(Address::parse("a@b@c.com").is_none());
    }
}
