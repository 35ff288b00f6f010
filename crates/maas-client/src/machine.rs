//! Handle to a single MAAS machine.
//!
//! A `Machine` is a system ID plus the client it talks through. It caches
//! nothing: every call is one request against the current server state.

use std::time::Duration;

use maas_core::{StatusName, StatusSet, SystemId};
use serde_json::Value;

use crate::client::MaasClient;
use crate::decode::decode;
use crate::error::{ClientError, Result};
use crate::poll::{poll, PollReport};
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Handle to a machine identified by its system ID.
pub struct Machine<T: Transport = HttpTransport> {
    client: MaasClient<T>,
    system_id: SystemId,
}

impl<T: Transport> Clone for Machine<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            system_id: self.system_id.clone(),
        }
    }
}

impl<T: Transport> std::fmt::Debug for Machine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("system_id", &self.system_id)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Machine<T> {
    pub(crate) fn new(client: MaasClient<T>, system_id: SystemId) -> Self {
        Self { client, system_id }
    }

    /// The machine's system ID.
    #[must_use]
    pub fn system_id(&self) -> &SystemId {
        &self.system_id
    }

    fn path(&self) -> String {
        format!("/machines/{}/", self.system_id)
    }

    async fn request(&self, request: ApiRequest) -> Result<Value> {
        let response = self.client.send(request).await?;
        decode(&response, true)
    }

    async fn action(&self, op: &str) -> Result<Value> {
        tracing::info!(system_id = %self.system_id, op = op, "Requesting machine action");
        self.request(ApiRequest::post(self.path()).op(op)).await
    }

    /// Fetch the machine's full detail record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a
    /// successful JSON document.
    pub async fn get_detail(&self) -> Result<Value> {
        self.request(ApiRequest::get(self.path())).await
    }

    /// Fetch the machine's current `status_name`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Machine::get_detail`], or
    /// `ClientError::UnexpectedResponse` if the detail has no string
    /// `status_name`.
    pub async fn status(&self) -> Result<StatusName> {
        let detail = self.get_detail().await?;
        detail
            .get("status_name")
            .and_then(Value::as_str)
            .map(StatusName::from)
            .ok_or_else(|| {
                ClientError::UnexpectedResponse(format!(
                    "machine {} detail has no status_name",
                    self.system_id
                ))
            })
    }

    /// Start commissioning the machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn commission(&self) -> Result<Value> {
        self.action("commission").await
    }

    /// Allocate the machine to the API key's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn allocate(&self) -> Result<Value> {
        tracing::info!(system_id = %self.system_id, "Allocating machine");
        let request = ApiRequest::post("/machines/")
            .op("allocate")
            .field("system_id", self.system_id.as_str());
        self.request(request).await
    }

    /// Start deploying the machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn deploy(&self) -> Result<Value> {
        self.action("deploy").await
    }

    /// Release the machine back to the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn release(&self) -> Result<Value> {
        self.action("release").await
    }

    /// Delete the machine record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn delete(&self) -> Result<Value> {
        tracing::info!(system_id = %self.system_id, "Deleting machine");
        self.request(ApiRequest::delete(self.path())).await
    }

    /// Wait until the machine reaches a status in `return_on`.
    ///
    /// Statuses in `continue_on` are waited out with the client's backoff
    /// policy. See [`crate::poll::poll`] for the exact semantics.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Timeout` if the machine stays in `continue_on`
    /// past `timeout`, `ClientError::UnexpectedStatus` if it reaches any other
    /// status, or the error of a failed status fetch.
    pub async fn poll(
        &self,
        return_on: &StatusSet,
        continue_on: &StatusSet,
        timeout: Duration,
    ) -> Result<PollReport> {
        tracing::debug!(
            system_id = %self.system_id,
            expected = %return_on,
            timeout_secs = timeout.as_secs(),
            "Waiting for machine status"
        );
        poll(
            || self.status(),
            return_on,
            continue_on,
            timeout,
            self.client.poll_config(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::transport::MockTransport;

    fn machine(mock: &Arc<MockTransport>) -> Machine<MockTransport> {
        MaasClient::from_shared(Arc::clone(mock)).machine(SystemId::new("abc123").unwrap())
    }

    #[tokio::test]
    async fn get_detail_fetches_machine_path() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(&json!({"system_id": "abc123", "status_name": "Ready"}));

        let detail = machine(&mock).get_detail().await.unwrap();
        assert_eq!(detail["status_name"], "Ready");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].path, "/machines/abc123/");
        assert!(requests[0].query.is_empty());
    }

    #[tokio::test]
    async fn actions_post_op_to_machine_path() {
        let mock = Arc::new(MockTransport::new());
        for _ in 0..3 {
            mock.push_ok(&json!({"system_id": "abc123"}));
        }

        let m = machine(&mock);
        m.commission().await.unwrap();
        m.deploy().await.unwrap();
        m.release().await.unwrap();

        let ops: Vec<(Method, String, Option<String>)> = mock
            .requests()
            .into_iter()
            .map(|r| {
                let op = r.query_value("op").map(str::to_string);
                (r.method, r.path, op)
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                (Method::POST, "/machines/abc123/".to_string(), Some("commission".to_string())),
                (Method::POST, "/machines/abc123/".to_string(), Some("deploy".to_string())),
                (Method::POST, "/machines/abc123/".to_string(), Some("release".to_string())),
            ]
        );
        assert!(mock.requests().iter().all(|r| r.form.is_empty()));
    }

    #[tokio::test]
    async fn allocate_posts_system_id_to_collection() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(&json!({"system_id": "abc123", "status_name": "Allocated"}));

        machine(&mock).allocate().await.unwrap();

        let request = &mock.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/machines/");
        assert_eq!(request.query_value("op"), Some("allocate"));
        assert_eq!(
            request.form,
            vec![("system_id".to_string(), "abc123".to_string())]
        );
    }

    #[tokio::test]
    async fn delete_issues_delete() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(&json!({}));

        machine(&mock).delete().await.unwrap();

        let request = &mock.requests()[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "/machines/abc123/");
    }

    #[tokio::test]
    async fn failed_action_is_a_status_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(StatusCode::CONFLICT, &json!({"error": "not ready"}));

        let err = machine(&mock).deploy().await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 409, .. }));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn status_requires_status_name() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(&json!({"system_id": "abc123"}));

        let err = machine(&mock).status().await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_reads_status_until_deployed() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(&json!({"status_name": "Deploying"}));
        mock.push_ok(&json!({"status_name": "Deploying"}));
        mock.push_ok(&json!({"status_name": "Deployed"}));

        let report = machine(&mock)
            .poll(
                &StatusSet::from(["Deployed"]),
                &StatusSet::from(["Deploying"]),
                Duration::from_secs(600),
            )
            .await
            .unwrap();

        assert_eq!(report.status, "Deployed");
        assert_eq!(report.attempts, 3);
        assert_eq!(report.waited, Duration::from_secs(9));
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_stops_on_failed_deployment() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(&json!({"status_name": "Deploying"}));
        mock.push_ok(&json!({"status_name": "Failed deployment"}));
        mock.push_ok(&json!({"status_name": "Deployed"}));

        let err = machine(&mock)
            .poll(
                &StatusSet::from(["Deployed"]),
                &StatusSet::from(["Deploying"]),
                Duration::from_secs(600),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedStatus(ref s) if s == "Failed deployment"));
        assert_eq!(mock.remaining(), 1);
    }

    #[test]
    fn handle_keeps_its_id() {
        let mock = Arc::new(MockTransport::new());
        let m = machine(&mock);
        let copy = m.clone();
        assert_eq!(copy.system_id(), m.system_id());
        assert!(format!("{m:?}").contains("abc123"));
    }
}
