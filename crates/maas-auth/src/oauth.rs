//! OAuth 1.0 PLAINTEXT request signing.
//!
//! MAAS authenticates API calls with OAuth 1.0 using the PLAINTEXT signature
//! method. The signature does not depend on the request, so one header value
//! can be produced per request from the key, a fresh nonce and a timestamp.

use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use uuid::Uuid;

use crate::api_key::ApiKey;

/// RFC 3986 unreserved characters are left as-is; everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Produces `Authorization` header values for a MAAS API key.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    key: ApiKey,
}

impl OAuthSigner {
    /// Create a signer for the given key.
    #[must_use]
    pub fn new(key: ApiKey) -> Self {
        Self { key }
    }

    /// The key this signer uses.
    #[must_use]
    pub fn api_key(&self) -> &ApiKey {
        &self.key
    }

    /// Build an `Authorization` header value with a fresh nonce and the
    /// current timestamp.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        self.authorization_header_with(&nonce, Utc::now().timestamp())
    }

    /// Build an `Authorization` header value with an explicit nonce and
    /// timestamp.
    #[must_use]
    pub fn authorization_header_with(&self, nonce: &str, timestamp: i64) -> String {
        // Consumer secret is always empty for MAAS keys.
        let signature = format!("&{}", encode(self.key.token_secret()));
        let timestamp = timestamp.to_string();

        let params = [
            ("oauth_nonce", nonce),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", "1.0"),
            ("oauth_signature_method", "PLAINTEXT"),
            ("oauth_consumer_key", self.key.consumer_key()),
            ("oauth_token", self.key.token_key()),
            ("oauth_signature", signature.as_str()),
        ];

        let fields: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{name}=\"{}\"", encode(value)))
            .collect();

        format!("OAuth {}", fields.join(", "))
    }
}
