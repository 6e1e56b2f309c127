//! Server operations: package execution

use crate::client::ClcClient;
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A blueprint package to run on a server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub package_id: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl Package {
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Per-server acknowledgement of a queued operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedOperation {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub is_queued: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl QueuedOperation {
    /// Id of the `status` link, used to poll the operation
    pub fn status_id(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "status")
            .and_then(|l| l.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExecutePackageRequest<'a> {
    servers: Vec<&'a str>,
    package: &'a Package,
}

impl ClcClient {
    /// Queue `package` for execution on each of `servers`
    pub async fn execute_package(
        &self,
        package: &Package,
        servers: &[&str],
    ) -> Result<Vec<QueuedOperation>> {
        let path = format!("operations/{}/servers/executePackage", self.alias());
        let body = ExecutePackageRequest {
            servers: servers.to_vec(),
            package,
        };

        tracing::debug!(
            "Executing package {} on {:?} ({} parameters)",
            package.package_id,
            servers,
            package.parameters.len()
        );

        let request = self.request(Method::POST, &path)?.json(&body);
        let queued: Vec<QueuedOperation> = self.send(request).await?;

        tracing::debug!("executePackage response: {:?}", queued);
        Ok(queued)
    }
}
