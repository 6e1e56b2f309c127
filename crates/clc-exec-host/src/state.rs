//! State of the instance being provisioned

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The resource a provisioner runs against
///
/// `id` is the identity the host assigned to the created resource; for a
/// cloud server this is the server name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    pub id: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl InstanceState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }
}
