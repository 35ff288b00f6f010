//! Core types for the MAAS client.
//!
//! This crate provides the foundational types shared by the client crates:
//!
//! - **Identifiers**: `SystemId` for machine records and `Hostname` for
//!   lookup and enlistment
//! - **Statuses**: `StatusName` and `StatusSet`, the open-ended status
//!   vocabulary reported by the server
//!
//! # Example
//!
//! ```
//! use maas_core::{Hostname, StatusSet, SystemId};
//!
//! let system_id = SystemId::new("4y3h7n").unwrap();
//! assert_eq!(system_id.as_str(), "4y3h7n");
//!
//! let hostname: Hostname = "node01.maas.example".parse().unwrap();
//! assert_eq!(hostname.short_name(), "node01");
//! assert_eq!(hostname.domain(), Some("maas.example"));
//!
//! let done = StatusSet::from_iter(["Deployed"]);
//! assert!(done.contains_str("Deployed"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod status;

pub use ids::{Hostname, IdError, SystemId};
pub use status::{StatusName, StatusSet};
