//! Identifier types for MAAS resources.
//!
//! System IDs are opaque strings assigned by the server when a machine is
//! created. Hostnames are caller-supplied and may be fully qualified.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty.
    #[error("identifier must not be empty")]
    Empty,

    /// The system ID contains a path separator.
    #[error("system id must not contain '/': {0}")]
    ContainsSlash(String),

    /// The hostname has no short name before the first dot.
    #[error("hostname has an empty short name: {0}")]
    EmptyShortName(String),
}

/// Server-assigned identifier of a machine record.
///
/// The value is used verbatim as a path segment (`/machines/<id>/`), so the
/// empty string and strings containing `/` are rejected.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemId(String);

impl SystemId {
    /// Create a `SystemId` from a server-provided string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains `/`.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.contains('/') {
            return Err(IdError::ContainsSlash(value));
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemId({})", self.0)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SystemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SystemId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SystemId> for String {
    fn from(id: SystemId) -> Self {
        id.0
    }
}

impl AsRef<str> for SystemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A machine hostname, optionally fully qualified.
///
/// The name is split at the first `.`: `node01.maas.example` has the short
/// name `node01` and the domain `maas.example`. A name without a dot has no
/// domain.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Hostname {
    full: String,
    short_len: usize,
}

impl Hostname {
    /// Parse a hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or starts with a dot.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let full = value.into();
        if full.is_empty() {
            return Err(IdError::Empty);
        }
        let short_len = full.find('.').unwrap_or(full.len());
        if short_len == 0 {
            return Err(IdError::EmptyShortName(full));
        }
        Ok(Self { full, short_len })
    }

    /// The part before the first dot.
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.full[..self.short_len]
    }

    /// The part after the first dot, if any.
    ///
    /// A trailing dot (`node01.`) yields no domain.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.full
            .get(self.short_len + 1..)
            .filter(|domain| !domain.is_empty())
    }

    /// The name exactly as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Debug for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hostname({})", self.full)
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for Hostname {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
