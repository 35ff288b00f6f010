//! OAuth 1.0 authentication for the MAAS API.
//!
//! This crate turns a MAAS API key into signed `Authorization` headers:
//!
//! - API key parsing (`consumer_key:token_key:token_secret`)
//! - PLAINTEXT signatures with a fresh nonce and timestamp per request
//!
//! # Example
//!
//! ```
//! use maas_auth::{ApiKey, OAuthSigner};
//!
//! let key: ApiKey = "ck:tk:secret".parse().unwrap();
//! let signer = OAuthSigner::new(key);
//!
//! let header = signer.authorization_header();
//! assert!(header.starts_with("OAuth "));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod api_key;
pub mod error;
pub mod oauth;

pub use api_key::ApiKey;
pub use error::{AuthError, Result};
pub use oauth::OAuthSigner;
