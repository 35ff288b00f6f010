//! MAAS API key parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::{AuthError, Result};

/// A MAAS API key.
///
/// MAAS hands out keys in the form `consumer_key:token_key:token_secret`.
/// The consumer secret is always empty.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    consumer_key: String,
    token_key: String,
    token_secret: String,
}

impl ApiKey {
    /// Parse an API key from its colon-delimited form.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not have exactly three non-empty parts.
    pub fn parse(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.trim().split(':').collect();
        let [consumer_key, token_key, token_secret] = parts.as_slice() else {
            return Err(AuthError::MalformedApiKey { parts: parts.len() });
        };

        for (name, value) in [
            ("consumer key", consumer_key),
            ("token key", token_key),
            ("token secret", token_secret),
        ] {
            if value.is_empty() {
                return Err(AuthError::EmptyKeyPart(name));
            }
        }

        Ok(Self {
            consumer_key: (*consumer_key).to_string(),
            token_key: (*token_key).to_string(),
            token_secret: (*token_secret).to_string(),
        })
    }

    /// The OAuth consumer key.
    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// The OAuth token (resource owner key).
    #[must_use]
    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    /// The OAuth token secret.
    #[must_use]
    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

impl FromStr for ApiKey {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("consumer_key", &self.consumer_key)
            .field("token_key", &self.token_key)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_key() {
        let key = ApiKey::parse("ck:tk:secret").unwrap();
        assert_eq!(key.consumer_key(), "ck");
        assert_eq!(key.token_key(), "tk");
        assert_eq!(key.token_secret(), "secret");
    }

    #[test]
    fn parse_trims_whitespace() {
        let key: ApiKey = " ck:tk:secret\n".parse().unwrap();
        assert_eq!(key.token_secret(), "secret");
    }

    #[test]
    fn parse_rejects_wrong_part_count() {
        assert_eq!(
            ApiKey::parse("ck:tk"),
            Err(AuthError::MalformedApiKey { parts: 2 })
        );
        assert_eq!(
            ApiKey::parse("a:b:c:d"),
            Err(AuthError::MalformedApiKey { parts: 4 })
        );
    }

    #[test]
    fn parse_rejects_empty_part() {
        assert_eq!(
            ApiKey::parse("ck::secret"),
            Err(AuthError::EmptyKeyPart("token key"))
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let key = ApiKey::parse("ck:tk:hunter2").unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("ck"));
        assert!(!debug.contains("hunter2"));
    }
}
