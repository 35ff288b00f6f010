//! Request and response types for MAAS operations.

use std::collections::BTreeMap;

use maas_core::{Hostname, SystemId};
use serde::Deserialize;

/// Architecture sent with every enlistment.
pub const ENLIST_ARCHITECTURE: &str = "amd64";

/// Request to enlist a new machine.
///
/// MAAS starts commissioning a machine as soon as it is enlisted.
#[derive(Debug, Clone)]
pub struct EnlistRequest {
    /// Hostname, optionally qualified with the MAAS domain.
    pub hostname: Hostname,
    /// MAC addresses of the machine's interfaces.
    pub mac_addresses: Vec<String>,
    /// Power driver (e.g., `ipmi`, `virsh`, `manual`).
    pub power_type: String,
    /// Driver-specific power parameters (e.g., `power_address`).
    pub power_parameters: BTreeMap<String, String>,
}

impl EnlistRequest {
    /// Create a request with no MAC addresses or power parameters.
    #[must_use]
    pub fn new(hostname: Hostname, power_type: impl Into<String>) -> Self {
        Self {
            hostname,
            mac_addresses: Vec::new(),
            power_type: power_type.into(),
            power_parameters: BTreeMap::new(),
        }
    }

    /// Add a MAC address.
    #[must_use]
    pub fn with_mac_address(mut self, mac: impl Into<String>) -> Self {
        self.mac_addresses.push(mac.into());
        self
    }

    /// Add a power parameter.
    #[must_use]
    pub fn with_power_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.power_parameters.insert(key.into(), value.into());
        self
    }

    /// Flatten the request into form fields.
    ///
    /// MAC addresses become repeated `mac_addresses` fields and each power
    /// parameter becomes `power_parameters_<key>`.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            (
                "hostname".to_string(),
                self.hostname.short_name().to_string(),
            ),
            (
                "architecture".to_string(),
                ENLIST_ARCHITECTURE.to_string(),
            ),
            ("power_type".to_string(), self.power_type.clone()),
        ];

        if let Some(domain) = self.hostname.domain() {
            fields.push(("domain".to_string(), domain.to_string()));
        }
        for mac in &self.mac_addresses {
            fields.push(("mac_addresses".to_string(), mac.clone()));
        }
        for (key, value) in &self.power_parameters {
            fields.push((format!("power_parameters_{key}"), value.clone()));
        }

        fields
    }
}

/// Entry of the `/nodes/` listing, reduced to what lookups need.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSummary {
    /// The node's system ID.
    pub system_id: SystemId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_fields_for_qualified_hostname() {
        let request = EnlistRequest::new("node01.maas.example".parse().unwrap(), "ipmi")
            .with_mac_address("52:54:00:00:00:01")
            .with_mac_address("52:54:00:00:00:02")
            .with_power_parameter("power_address", "10.0.0.5")
            .with_power_parameter("power_user", "admin");

        let fields = request.form_fields();
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("hostname", "node01"),
                ("architecture", "amd64"),
                ("power_type", "ipmi"),
                ("domain", "maas.example"),
                ("mac_addresses", "52:54:00:00:00:01"),
                ("mac_addresses", "52:54:00:00:00:02"),
                ("power_parameters_power_address", "10.0.0.5"),
                ("power_parameters_power_user", "admin"),
            ]
        );
    }

    #[test]
    fn form_fields_without_domain() {
        let request = EnlistRequest::new("node01".parse().unwrap(), "manual");
        let fields = request.form_fields();
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(|(k, _)| k != "domain"));
    }

    #[test]
    fn node_summary_rejects_empty_id() {
        let parsed: Result<NodeSummary, _> = serde_json::from_str(r#"{"system_id": ""}"#);
        assert!(parsed.is_err());

        let node: NodeSummary =
            serde_json::from_str(r#"{"system_id": "abc", "hostname": "node01"}"#).unwrap();
        assert_eq!(node.system_id.as_str(), "abc");
    }
}
