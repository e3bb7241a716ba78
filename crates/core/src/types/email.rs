//! Validated email address type.
//!
//! Shoppers type addresses into forms; the platform keys customer accounts by
//! them. [`Email::parse`] is the one place the two meet: it normalizes what
//! the form sent and rejects anything that could not be a deliverable
//! address, so every `Email` in the system is already in canonical form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest address we accept, per the SMTP path limit.
const MAX_LEN: usize = 254;

/// Why an address was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    /// Nothing left after trimming.
    #[error("email address is empty")]
    Empty,

    /// Longer than any deliverable address can be.
    #[error("email address is too long ({actual} characters, limit {limit})", limit = MAX_LEN)]
    TooLong {
        /// Length of the rejected input after trimming.
        actual: usize,
    },

    /// Does not look like `name@domain`.
    #[error("email address must look like name@domain")]
    Malformed,
}

/// A normalized, structurally valid email address.
///
/// Construction goes through [`Email::parse`], including serde
/// deserialization, so holding an `Email` means the address has already been
/// trimmed, lowercased, and shape-checked.
///
/// # Examples
///
/// ```
/// use vendora_core::Email;
///
/// let email = Email::parse("  Ada@Example.COM ")?;
/// assert_eq!(email.as_str(), "ada@example.com");
/// assert_eq!(email.domain(), "example.com");
/// # Ok::<(), vendora_core::EmailError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalize and validate an address.
    ///
    /// The input is trimmed and lowercased so `Ada@Example.com` and
    /// `ada@example.com` name the same account. Validation is structural
    /// only: exactly one `@`, something on both sides, a dot in the domain,
    /// no whitespace. Whether the mailbox exists is the mail system's
    /// problem, not ours.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the input is empty, too long, or not
    /// shaped like `name@domain`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let cleaned = input.trim().to_lowercase();

        if cleaned.is_empty() {
            return Err(EmailError::Empty);
        }
        if cleaned.len() > MAX_LEN {
            return Err(EmailError::TooLong {
                actual: cleaned.len(),
            });
        }
        if cleaned.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        let Some((local, domain)) = cleaned.split_once('@') else {
            return Err(EmailError::Malformed);
        };

        // A dotless domain is either a typo or something like root@localhost,
        // and neither belongs on a customer account.
        if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(EmailError::Malformed);
        }

        Ok(Self(cleaned))
    }

    /// The normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        // parse guarantees exactly one `@` with a non-empty tail.
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse("  Ada.Lovelace@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ada.lovelace@example.com");
    }

    #[test]
    fn test_parse_keeps_plus_tags() {
        let email = Email::parse("ada+orders@example.com").unwrap();
        assert_eq!(email.as_str(), "ada+orders@example.com");
    }

    #[test]
    fn test_rejects_addresses_without_structure() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("ada"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ada@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ada@@example.com"), Err(EmailError::Malformed));
        assert_eq!(
            Email::parse("ada lovelace@example.com"),
            Err(EmailError::Malformed)
        );
    }

    #[test]
    fn test_rejects_bare_hostnames() {
        assert_eq!(Email::parse("root@localhost"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_enforces_length_limit() {
        let longest = format!("{}@x.io", "a".repeat(249));
        assert!(Email::parse(&longest).is_ok());

        let too_long = format!("{}@x.io", "a".repeat(250));
        assert_eq!(
            Email::parse(&too_long),
            Err(EmailError::TooLong { actual: 255 })
        );
    }

    #[test]
    fn test_deserialization_validates() {
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());

        let email: Email = serde_json::from_str("\"Ada@Example.com\"").unwrap();
        assert_eq!(email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("ada@example.com").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"ada@example.com\""
        );
    }

    #[test]
    fn test_domain_accessor() {
        let email = Email::parse("ada@mail.example.co.uk").unwrap();
        assert_eq!(email.domain(), "mail.example.co.uk");
    }
}
