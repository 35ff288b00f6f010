//! Async client for MAAS machine lifecycle management.
//!
//! This crate wraps the MAAS REST API calls needed to take a machine from
//! enlistment to deployment and back:
//!
//! - hostname lookup and enlistment on [`MaasClient`]
//! - commission, allocate, deploy, release and delete on [`Machine`]
//! - waiting for a machine to settle in a status with [`Machine::poll`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          MaasClient                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Lookup /   │ │  Machine    │ │    poll (backoff    │    │
//! │  │  Enlist     │ │  handles    │ │    state wait)      │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ decode (JSON envelope)
//!                              ▼
//!                   ┌──────────────────────┐
//!                   │  Transport (trait)   │
//!                   └──────────┬───────────┘
//!                              │
//!                   ┌──────────▼───────────┐
//!                   │   HttpTransport      │
//!                   │ (reqwest + OAuth 1.0)│
//!                   └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use maas_client::{ClientConfig, MaasClient, StatusSet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("http://maas:5240/MAAS/api/2.0", "ck:tk:secret");
//! let client = MaasClient::new(&config)?;
//!
//! let hostname = "node01.maas.example".parse()?;
//! if let Some(machine) = client.get_machine(&hostname).await? {
//!     machine.allocate().await?;
//!     machine.deploy().await?;
//!     machine
//!         .poll(
//!             &StatusSet::from(["Deployed"]),
//!             &StatusSet::from(["Deploying"]),
//!             Duration::from_secs(1800),
//!         )
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod machine;
pub mod poll;
pub mod transport;
pub mod types;

pub use client::MaasClient;
pub use config::{ClientConfig, PollConfig};
pub use decode::{decode, decode_as};
pub use error::{ClientError, Result};
pub use machine::Machine;
pub use poll::{poll, Backoff, PollReport};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};
pub use types::{EnlistRequest, NodeSummary};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;

// Re-export commonly used types from dependencies for convenience
pub use maas_auth::{ApiKey, OAuthSigner};
pub use maas_core::{Hostname, StatusName, StatusSet, SystemId};
