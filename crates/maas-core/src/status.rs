//! Machine status names.
//!
//! The server reports machine state as a human-readable `status_name` string
//! (`"Ready"`, `"Deploying"`, `"Failed commissioning"`, ...). The vocabulary
//! is defined by the server and grows between releases, so statuses are kept
//! as opaque strings and only ever compared against caller-supplied sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A status name as reported by the server.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusName(String);

impl StatusName {
    /// Create a status name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Return the status as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusName({})", self.0)
    }
}

impl fmt::Display for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StatusName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for StatusName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StatusName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A set of status names, as passed to the state-wait loop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet(BTreeSet<StatusName>);

impl StatusSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a status to the set.
    pub fn insert(&mut self, status: impl Into<StatusName>) -> bool {
        self.0.insert(status.into())
    }

    /// Returns true if the set contains `status`.
    #[must_use]
    pub fn contains(&self, status: &StatusName) -> bool {
        self.0.contains(status)
    }

    /// Returns true if the set contains a status with the given name.
    #[must_use]
    pub fn contains_str(&self, status: &str) -> bool {
        self.0.iter().any(|s| s.as_str() == status)
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of statuses in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the statuses in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusName> {
        self.0.iter()
    }
}

impl fmt::Debug for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter().map(StatusName::as_str)).finish()
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, status) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(status.as_str())?;
        }
        f.write_str("}")
    }
}

impl<S: Into<StatusName>> FromIterator<S> for StatusSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<StatusName>> Extend<S> for StatusSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<StatusName>, const N: usize> From<[S; N]> for StatusSet {
    fn from(statuses: [S; N]) -> Self {
        statuses.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_compares_with_str() {
        let status = StatusName::new("Deployed");
        assert_eq!(status, "Deployed");
        assert_eq!(status.as_str(), "Deployed");
        assert_eq!(status.to_string(), "Deployed");
    }

    #[test]
    fn set_membership() {
        let set = StatusSet::from(["Deploying", "Commissioning"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&StatusName::from("Deploying")));
        assert!(set.contains_str("Commissioning"));
        assert!(!set.contains_str("deploying"));
        assert!(!set.contains_str("Ready"));
    }

    #[test]
    fn set_display_is_sorted() {
        let set: StatusSet = ["Ready", "Allocated"].into_iter().collect();
        assert_eq!(set.to_string(), "{Allocated, Ready}");
        assert_eq!(StatusSet::new().to_string(), "{}");
    }

    #[test]
    fn set_insert_deduplicates() {
        let mut set = StatusSet::new();
        assert!(set.is_empty());
        assert!(set.insert("Ready"));
        assert!(!set.insert("Ready"));
        set.extend(["New", "Ready"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn status_serde_is_transparent() {
        let status: StatusName = serde_json::from_str("\"Broken\"").unwrap();
        assert_eq!(status, "Broken");

        let set: StatusSet = serde_json::from_str("[\"Ready\", \"New\"]").unwrap();
        assert!(set.contains_str("New"));
    }
}
