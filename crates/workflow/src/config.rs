//! Workflow configuration
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the clearance workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceConfig {
    /// Upper bound for every external collaborator call (generator, notifier)
    #[serde(default = "default_external_timeout_ms")]
    pub external_timeout_ms: u64,

    /// Notify the subject when a request is submitted
    #[serde(default = "default_true")]
    pub notify_on_submit: bool,

    /// Notify the subject when a department decides
    #[serde(default = "default_true")]
    pub notify_on_decision: bool,

    /// Notify the subject once the certificate has been generated
    #[serde(default = "default_true")]
    pub notify_on_issuance: bool,
}

fn default_external_timeout_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for ClearanceConfig {
    fn default() -> Self {
        Self {
            external_timeout_ms: default_external_timeout_ms(),
            notify_on_submit: true,
            notify_on_decision: true,
            notify_on_issuance: true,
        }
    }
}

impl ClearanceConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// External call timeout as Duration
    pub fn external_timeout(&self) -> Duration {
        Duration::from_millis(self.external_timeout_ms)
    }
}
