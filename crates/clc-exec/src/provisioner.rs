//! clc_exec provisioner implementation

use crate::config::{PROVISIONER_NAME, ProvisionerConfig, decode_config};
use crate::env::{BASE_URL_ENV, EnvReader, SystemEnv, merge_env_overrides};
use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use clc_exec_host::{
    InstanceState, ResourceConfig, ResourceProvisioner, UiOutput, ValidationError, Validator,
};
use clc_exec_sdk::{ClcApi, Connector, HttpConnector, StatusResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Executes a package on the provisioned server and waits for it
pub struct ClcExecProvisioner<C: Connector = HttpConnector> {
    connector: C,
    env: Arc<dyn EnvReader>,
    poll_timeout: Option<Duration>,
}

impl ClcExecProvisioner<HttpConnector> {
    /// HTTP provisioner honouring `CLC_BASE_URL` from the process environment
    pub fn from_env() -> Self {
        Self::http(HttpConnector::new())
    }

    /// Provisioner over `connector`; `CLC_BASE_URL` overrides its endpoint
    pub fn http(mut connector: HttpConnector) -> Self {
        if let Some(base_url) = SystemEnv.var(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("Using {}={}", BASE_URL_ENV, base_url);
            connector = connector.with_base_url(base_url);
        }
        Self::new(connector)
    }
}

impl<C: Connector> ClcExecProvisioner<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            env: Arc::new(SystemEnv),
            poll_timeout: None,
        }
    }

    /// Replace the environment used for the credential fallback
    pub fn with_env(mut self, env: impl EnvReader + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Bound the wait for the queued operation
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    pub fn decode_config(&self, config: &ResourceConfig) -> Result<ProvisionerConfig> {
        decode_config(config, self.env.as_ref())
    }

    fn validator() -> Validator {
        Validator::new()
            .required(["username", "password", "account", "package"])
            .optional(["parameters.*"])
    }
}

#[async_trait]
impl<C: Connector> ResourceProvisioner for ClcExecProvisioner<C> {
    type Error = ProvisionError;

    fn name(&self) -> &str {
        PROVISIONER_NAME
    }

    fn validate(&self, config: &ResourceConfig) -> (Vec<String>, Vec<ValidationError>) {
        let validator = Self::validator();
        let (warnings, errors) = validator.validate(config);

        if warnings.is_empty() && errors.is_empty() {
            tracing::debug!("No issues with resource config");
            return (warnings, errors);
        }

        tracing::debug!(
            "First validation pass: {} warnings, {} errors; revalidating with environment",
            warnings.len(),
            errors.len()
        );
        let merged = merge_env_overrides(config, self.env.as_ref());
        validator.validate(&merged)
    }

    async fn apply(
        &self,
        output: &dyn UiOutput,
        state: &InstanceState,
        config: &ResourceConfig,
    ) -> Result<()> {
        tracing::debug!("Applying {} to instance {:?}", PROVISIONER_NAME, state);

        let p = self.decode_config(config)?;

        let server_id = state.id.as_str();
        if server_id.is_empty() {
            return Err(ProvisionError::MissingServerId);
        }

        tracing::info!("Executing package {} on server {}", p.package, server_id);
        output.output(&format!(
            "Executing package '{}' on server '{}'",
            p.package, server_id
        ));

        let mut client = self
            .connector
            .connect(&p.credentials())
            .map_err(ProvisionError::ClientConfig)?;

        client
            .authenticate()
            .await
            .map_err(ProvisionError::Authentication)?;

        let package = p.package_request();
        let queued = client
            .execute_package(&package, server_id)
            .await
            .map_err(|source| ProvisionError::Submission {
                package: p.package.clone(),
                source,
            })?;

        // One target per invocation: only the first entry is meaningful
        let first = queued.first().ok_or_else(|| ProvisionError::EmptyResponse {
            package: p.package.clone(),
            server: server_id.to_string(),
        })?;
        if !first.is_queued {
            return Err(ProvisionError::NotQueued {
                package: p.package.clone(),
                server: server_id.to_string(),
                reason: first
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "no error message returned".to_string()),
            });
        }

        let status_id = first
            .status_id()
            .ok_or_else(|| ProvisionError::StatusUnavailable {
                server: server_id.to_string(),
            })?;
        tracing::debug!("Package {} queued as {}", p.package, status_id);

        wait_status(&client, status_id, self.poll_timeout).await?;

        output.output(&format!(
            "Package {} successfully executed on {}",
            p.package, server_id
        ));
        Ok(())
    }
}

/// Block until operation `id` reaches a terminal state
///
/// Fails when registration fails, when the poller ends without delivering a
/// status, when `timeout` elapses, or when the job itself failed.
pub async fn wait_status<A>(
    client: &A,
    id: &str,
    timeout: Option<Duration>,
) -> Result<StatusResponse>
where
    A: ClcApi + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(1);
    client
        .poll_status(id, tx)
        .await
        .map_err(|source| ProvisionError::StatusRegistration {
            id: id.to_string(),
            source,
        })?;

    let update = match timeout {
        Some(limit) => tokio::time::timeout(limit, rx.recv())
            .await
            .map_err(|_| ProvisionError::Timeout {
                id: id.to_string(),
                timeout: limit,
            })?,
        None => rx.recv().await,
    };

    let status = update
        .ok_or_else(|| ProvisionError::StatusChannelClosed { id: id.to_string() })?
        .map_err(|source| ProvisionError::StatusPoll {
            id: id.to_string(),
            source,
        })?;

    tracing::debug!("Status of {}: {}", id, status.status);
    if status.failed() {
        return Err(ProvisionError::JobFailed {
            id: id.to_string(),
            status: status.status,
        });
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_exec_host::BufferedOutput;
    use clc_exec_sdk::{
        Credentials, JobStatus, Link, Package, QueuedOperation, SdkError, StatusUpdate,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What the fake API answers at each step
    #[derive(Clone)]
    struct Script {
        fail_connect: bool,
        fail_auth: bool,
        fail_submit: bool,
        queued: Vec<QueuedOperation>,
        fail_registration: bool,
        /// `None` drops the channel without sending
        terminal: Option<JobStatus>,
        poll_error: bool,
    }

    impl Default for Script {
        fn default() -> Self {
            Self {
                fail_connect: false,
                fail_auth: false,
                fail_submit: false,
                queued: vec![queued("srv-1", true, Some("job-42"))],
                fail_registration: false,
                terminal: Some(JobStatus::Succeeded),
                poll_error: false,
            }
        }
    }

    #[derive(Default)]
    struct Calls {
        connect: AtomicUsize,
        authenticate: AtomicUsize,
        execute: AtomicUsize,
        poll: AtomicUsize,
        credentials: Mutex<Option<Credentials>>,
        submitted: Mutex<Vec<(Package, String)>>,
        polled: Mutex<Vec<String>>,
    }

    struct FakeConnector {
        script: Script,
        calls: Arc<Calls>,
    }

    struct FakeClient {
        script: Script,
        calls: Arc<Calls>,
    }

    impl Connector for FakeConnector {
        type Client = FakeClient;

        fn connect(&self, credentials: &Credentials) -> clc_exec_sdk::Result<FakeClient> {
            self.calls.connect.fetch_add(1, Ordering::SeqCst);
            *self.calls.credentials.lock().unwrap() = Some(credentials.clone());
            if self.script.fail_connect {
                return Err(SdkError::InvalidConfig("invalid base URL".to_string()));
            }
            Ok(FakeClient {
                script: self.script.clone(),
                calls: self.calls.clone(),
            })
        }
    }

    #[async_trait]
    impl ClcApi for FakeClient {
        async fn authenticate(&mut self) -> clc_exec_sdk::Result<()> {
            self.calls.authenticate.fetch_add(1, Ordering::SeqCst);
            if self.script.fail_auth {
                return Err(SdkError::AuthenticationFailed("bad credentials".to_string()));
            }
            Ok(())
        }

        async fn execute_package(
            &self,
            package: &Package,
            server_id: &str,
        ) -> clc_exec_sdk::Result<Vec<QueuedOperation>> {
            self.calls.execute.fetch_add(1, Ordering::SeqCst);
            self.calls
                .submitted
                .lock()
                .unwrap()
                .push((package.clone(), server_id.to_string()));
            if self.script.fail_submit {
                return Err(SdkError::Api {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            Ok(self.script.queued.clone())
        }

        async fn poll_status(
            &self,
            id: &str,
            tx: mpsc::Sender<StatusUpdate>,
        ) -> clc_exec_sdk::Result<()> {
            self.calls.poll.fetch_add(1, Ordering::SeqCst);
            self.calls.polled.lock().unwrap().push(id.to_string());
            if self.script.fail_registration {
                return Err(SdkError::NotAuthenticated);
            }
            if self.script.poll_error {
                tx.send(Err(SdkError::PollFailed {
                    id: id.to_string(),
                    attempts: 5,
                    message: "503".to_string(),
                }))
                .await
                .unwrap();
            } else if let Some(status) = self.script.terminal {
                tx.send(Ok(StatusResponse::new(status))).await.unwrap();
            }
            Ok(())
        }
    }

    fn queued(server: &str, is_queued: bool, status_id: Option<&str>) -> QueuedOperation {
        QueuedOperation {
            server: server.to_string(),
            is_queued,
            error_message: None,
            links: status_id
                .map(|id| {
                    vec![Link {
                        rel: "status".to_string(),
                        href: format!("/v2/operations/a/status/{}", id),
                        id: Some(id.to_string()),
                    }]
                })
                .unwrap_or_default(),
        }
    }

    fn provisioner(script: Script) -> (ClcExecProvisioner<FakeConnector>, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let connector = FakeConnector {
            script,
            calls: calls.clone(),
        };
        let provisioner =
            ClcExecProvisioner::new(connector).with_env(HashMap::<String, String>::new());
        (provisioner, calls)
    }

    fn full_config() -> ResourceConfig {
        ResourceConfig::from_value(json!({
            "username": "u",
            "password": "p",
            "account": "a",
            "package": "PKG1",
            "parameters": {"foo": "bar"}
        }))
        .unwrap()
    }

    async fn run(script: Script) -> (Result<()>, Arc<Calls>, BufferedOutput) {
        let (provisioner, calls) = provisioner(script);
        let output = BufferedOutput::new();
        let result = provisioner
            .apply(&output, &InstanceState::new("srv-1"), &full_config())
            .await;
        (result, calls, output)
    }

    #[tokio::test]
    async fn test_apply_end_to_end() {
        let (result, calls, output) = run(Script::default()).await;

        assert!(result.is_ok(), "apply failed: {:?}", result);
        let lines = output.lines();
        assert_eq!(lines.first().unwrap(), "Executing package 'PKG1' on server 'srv-1'");
        let last = lines.last().unwrap();
        assert!(last.contains("PKG1") && last.contains("srv-1"));
        assert!(last.contains("successfully executed"));

        let credentials = calls.credentials.lock().unwrap().clone().unwrap();
        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p");
        assert_eq!(credentials.account, "a");

        let submitted = calls.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let (package, server) = &submitted[0];
        assert_eq!(package.package_id, "PKG1");
        assert_eq!(package.parameters["foo"], "bar");
        assert_eq!(server, "srv-1");

        assert_eq!(*calls.polled.lock().unwrap(), vec!["job-42".to_string()]);
    }

    #[tokio::test]
    async fn test_decode_failure_never_connects() {
        let (provisioner, calls) = provisioner(Script::default());
        let config = full_config().with_value("region", json!("WA1"));
        let output = BufferedOutput::new();

        let err = provisioner
            .apply(&output, &InstanceState::new("srv-1"), &config)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::UnknownKeys(_)));
        assert_eq!(calls.connect.load(Ordering::SeqCst), 0);
        assert!(output.lines().is_empty());
    }

    #[tokio::test]
    async fn test_missing_server_id() {
        let (provisioner, calls) = provisioner(Script::default());
        let err = provisioner
            .apply(&BufferedOutput::new(), &InstanceState::default(), &full_config())
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::MissingServerId));
        assert_eq!(calls.connect.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_construction_failure() {
        let (result, calls, _) = run(Script {
            fail_connect: true,
            ..Script::default()
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProvisionError::ClientConfig(_)));
        assert!(err.to_string().starts_with("Failed to create CLC config"));
        assert_eq!(calls.authenticate.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authentication_failure_stops_before_submit() {
        let (result, calls, _) = run(Script {
            fail_auth: true,
            ..Script::default()
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Authentication(SdkError::AuthenticationFailed(_))
        ));
        assert!(err.to_string().contains("bad credentials"));
        assert_eq!(calls.execute.load(Ordering::SeqCst), 0);
        assert_eq!(calls.poll.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_failure() {
        let (result, calls, _) = run(Script {
            fail_submit: true,
            ..Script::default()
        })
        .await;

        assert!(matches!(result, Err(ProvisionError::Submission { .. })));
        assert_eq!(calls.poll.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_queued_stops_before_poll() {
        let mut op = queued("srv-1", false, Some("job-42"));
        op.error_message = Some("The server is powered off.".to_string());
        let (result, calls, output) = run(Script {
            queued: vec![op],
            ..Script::default()
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProvisionError::NotQueued { .. }));
        assert!(err.to_string().contains("The server is powered off."));
        assert_eq!(calls.poll.load(Ordering::SeqCst), 0);
        assert_eq!(output.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_response() {
        let (result, calls, _) = run(Script {
            queued: Vec::new(),
            ..Script::default()
        })
        .await;

        assert!(matches!(result, Err(ProvisionError::EmptyResponse { .. })));
        assert_eq!(calls.poll.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_only_first_entry_is_consulted() {
        let (result, _, _) = run(Script {
            queued: vec![
                queued("srv-1", true, Some("job-42")),
                queued("srv-2", false, None),
            ],
            ..Script::default()
        })
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_status_unavailable() {
        let (result, calls, _) = run(Script {
            queued: vec![queued("srv-1", true, None)],
            ..Script::default()
        })
        .await;

        assert!(matches!(result, Err(ProvisionError::StatusUnavailable { .. })));
        assert_eq!(calls.poll.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_job_failure_mentions_id_and_status() {
        let (result, _, output) = run(Script {
            terminal: Some(JobStatus::Failed),
            ..Script::default()
        })
        .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("job-42"));
        assert!(message.contains("failed"));
        assert!(!output.lines().iter().any(|l| l.contains("successfully")));
    }

    #[tokio::test]
    async fn test_registration_error_is_propagated() {
        let (result, _, _) = run(Script {
            fail_registration: true,
            ..Script::default()
        })
        .await;

        assert!(matches!(
            result,
            Err(ProvisionError::StatusRegistration { ref id, .. }) if id == "job-42"
        ));
    }

    #[tokio::test]
    async fn test_poll_error_is_propagated() {
        let (result, _, _) = run(Script {
            poll_error: true,
            ..Script::default()
        })
        .await;

        assert!(matches!(result, Err(ProvisionError::StatusPoll { .. })));
    }

    #[tokio::test]
    async fn test_channel_closed_without_status() {
        let (result, _, _) = run(Script {
            terminal: None,
            ..Script::default()
        })
        .await;

        assert!(matches!(result, Err(ProvisionError::StatusChannelClosed { .. })));
    }

    struct SilentClient;

    #[async_trait]
    impl ClcApi for SilentClient {
        async fn authenticate(&mut self) -> clc_exec_sdk::Result<()> {
            Ok(())
        }

        async fn execute_package(
            &self,
            _package: &Package,
            _server_id: &str,
        ) -> clc_exec_sdk::Result<Vec<QueuedOperation>> {
            Ok(Vec::new())
        }

        async fn poll_status(
            &self,
            _id: &str,
            tx: mpsc::Sender<StatusUpdate>,
        ) -> clc_exec_sdk::Result<()> {
            // Keep the sender alive without ever reporting
            tokio::spawn(async move {
                tx.closed().await;
            });
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_wait_status_timeout() {
        let err = wait_status(&SilentClient, "job-1", Some(Duration::from_millis(20)))
            .await
            .unwrap_err();

        match err {
            ProvisionError::Timeout { id, timeout } => {
                assert_eq!(id, "job-1");
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_clean_config() {
        let (provisioner, _) = provisioner(Script::default());
        let (warnings, errors) = provisioner.validate(&full_config());
        assert!(warnings.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let (provisioner, _) = provisioner(Script::default());
        let config = ResourceConfig::default();

        let (_, errors) = provisioner.validate(&config);
        let keys: Vec<_> = errors.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["username", "password", "account", "package"]);
    }

    #[test]
    fn test_validate_uses_env_fallback() {
        let (provisioner, _) = provisioner(Script::default());
        let mut env = HashMap::new();
        env.insert("CLC_USERNAME".to_string(), "foo".to_string());
        env.insert("CLC_PASSWORD".to_string(), "bar".to_string());
        env.insert("CLC_ACCOUNT".to_string(), "ACME".to_string());
        let provisioner = provisioner.with_env(env);

        let config = ResourceConfig::from_value(json!({"package": "PKG1"})).unwrap();
        let (warnings, errors) = provisioner.validate(&config);
        assert!(warnings.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_env_cannot_supply_package() {
        let (provisioner, _) = provisioner(Script::default());
        let mut env = HashMap::new();
        env.insert("CLC_USERNAME".to_string(), "foo".to_string());
        env.insert("CLC_PASSWORD".to_string(), "bar".to_string());
        env.insert("CLC_ACCOUNT".to_string(), "ACME".to_string());
        let provisioner = provisioner.with_env(env);

        let (_, errors) = provisioner.validate(&ResourceConfig::default());
        assert_eq!(
            errors,
            vec![ValidationError::new("package", "required field is not set")]
        );
    }

    #[test]
    fn test_validate_reports_empty_credentials() {
        let (provisioner, _) = provisioner(Script::default());
        let config = full_config().with_value("username", json!(""));

        let (_, errors) = provisioner.validate(&config);
        assert_eq!(
            errors,
            vec![ValidationError::new("username", "required field is empty")]
        );

        let mut env = HashMap::new();
        env.insert("CLC_USERNAME".to_string(), "foo".to_string());
        let (_, errors) = provisioner.with_env(env).validate(&config);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_second_pass_keeps_warnings() {
        let (provisioner, _) = provisioner(Script::default());
        let config = full_config().with_value("parameters", json!({"count": 3}));

        let (warnings, errors) = provisioner.validate(&config);
        assert_eq!(warnings.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_name() {
        let (provisioner, _) = provisioner(Script::default());
        assert_eq!(provisioner.name(), "clc_exec");
    }
}
