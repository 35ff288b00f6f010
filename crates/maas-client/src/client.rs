//! MAAS API client.
//!
//! `MaasClient` owns the authenticated transport and hands out [`Machine`]
//! handles. It also implements the hostname lookup and enlistment calls
//! that are not tied to an existing machine.

use std::sync::Arc;

use maas_core::{Hostname, SystemId};

use crate::config::{ClientConfig, PollConfig};
use crate::decode::{decode, decode_as};
use crate::error::{ClientError, Result};
use crate::machine::Machine;
use crate::transport::{ApiRequest, HttpTransport, RawResponse, Transport};
use crate::types::{EnlistRequest, NodeSummary};

/// Client for a MAAS region controller.
///
/// Cloning is cheap; clones share the transport.
pub struct MaasClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    poll_config: PollConfig,
}

impl<T: Transport> Clone for MaasClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            poll_config: self.poll_config.clone(),
        }
    }
}

impl<T: Transport> std::fmt::Debug for MaasClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaasClient")
            .field("poll_config", &self.poll_config)
            .finish_non_exhaustive()
    }
}

impl MaasClient<HttpTransport> {
    /// Create an HTTP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is malformed, the poll policy is
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.poll.validate()?;
        let transport = HttpTransport::new(config)?;
        tracing::debug!(base_url = %transport.base_url(), "Created MAAS client");
        Ok(Self::with_transport(transport).with_poll_config(config.poll.clone()))
    }

    /// Create an HTTP client from `MAAS_URL` and `MAAS_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment is incomplete or the client
    /// cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> MaasClient<T> {
    /// Create a client over a custom transport with the default poll policy.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a client over a transport that is shared with other owners.
    #[must_use]
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            poll_config: PollConfig::default(),
        }
    }

    /// Replace the poll policy used by machine handles.
    ///
    /// The policy is installed as given; see [`PollConfig::validate`].
    #[must_use]
    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// The poll policy used by machine handles.
    #[must_use]
    pub fn poll_config(&self) -> &PollConfig {
        &self.poll_config
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        self.transport.send(request).await
    }

    /// Send a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn get(&self, path: &str) -> Result<RawResponse> {
        self.send(ApiRequest::get(path)).await
    }

    /// Send a PUT request with form fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn put<I, K, V>(&self, path: &str, form: I) -> Result<RawResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.send(ApiRequest::put(path).fields(form)).await
    }

    /// Send a POST request with form fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn post<I, K, V>(&self, path: &str, form: I) -> Result<RawResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.send(ApiRequest::post(path).fields(form)).await
    }

    /// Send a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Get a handle for a known system ID.
    #[must_use]
    pub fn machine(&self, system_id: SystemId) -> Machine<T> {
        Machine::new(self.clone(), system_id)
    }

    /// Look up the system ID of the node with the given hostname.
    ///
    /// A qualified hostname is matched on both short name and domain.
    ///
    /// # Errors
    ///
    /// Returns a remote error if the listing cannot be decoded,
    /// `ClientError::UnexpectedResponse` if it is not a list of nodes, and
    /// `ClientError::InvariantViolated` if more than one node matches.
    pub async fn find_node_id(&self, hostname: &Hostname) -> Result<Option<SystemId>> {
        let mut request = ApiRequest::get("/nodes/").query("hostname", hostname.short_name());
        if let Some(domain) = hostname.domain() {
            request = request.query("domain", domain);
        }

        let response = self.send(request).await?;
        let nodes: Vec<NodeSummary> = decode_as(&response, false)?;

        match nodes.as_slice() {
            [] => {
                tracing::debug!(hostname = %hostname, "No node found");
                Ok(None)
            }
            [node] => Ok(Some(node.system_id.clone())),
            _ => {
                tracing::warn!(
                    hostname = %hostname,
                    count = nodes.len(),
                    "Hostname matched more than one node"
                );
                Err(ClientError::InvariantViolated(format!(
                    "hostname {hostname} matched {} nodes",
                    nodes.len()
                )))
            }
        }
    }

    /// Get a handle for the machine with the given hostname, if it exists.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`MaasClient::find_node_id`].
    pub async fn get_machine(&self, hostname: &Hostname) -> Result<Option<Machine<T>>> {
        Ok(self
            .find_node_id(hostname)
            .await?
            .map(|system_id| self.machine(system_id)))
    }

    /// Enlist a new machine and return a handle to it.
    ///
    /// The creation response does not carry a usable handle, so the machine
    /// is looked up by hostname afterwards. `None` means the lookup did not
    /// find it.
    ///
    /// # Errors
    ///
    /// Returns an error if the creation request is rejected or the lookup
    /// fails.
    pub async fn enlist_and_commission(&self, request: &EnlistRequest) -> Result<Option<Machine<T>>> {
        tracing::info!(
            hostname = %request.hostname,
            power_type = %request.power_type,
            macs = request.mac_addresses.len(),
            "Enlisting machine"
        );

        let response = self
            .send(ApiRequest::post("/machines/").fields(request.form_fields()))
            .await?;
        decode(&response, true)?;

        self.get_machine(&request.hostname).await
    }
}
