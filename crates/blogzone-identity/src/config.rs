//! Gateway connection settings.

/// Identifiers the vendor SDK needs at startup.
///
/// Only `api_key` and `project_id` are required by the platform; the
/// other two are derived from the project id when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_key: String,
    pub project_id: String,
    pub auth_domain: Option<String>,
    pub storage_bucket: Option<String>,
}

impl GatewayConfig {
    /// Creates a config with the two required identifiers.
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_domain: None,
            storage_bucket: None,
        }
    }

    /// Domain that hosts the interactive sign-in pages.
    pub fn auth_domain(&self) -> String {
        self.auth_domain
            .clone()
            .unwrap_or_else(|| format!("{}.firebaseapp.com", self.project_id))
    }

    /// Bucket that profile pictures are uploaded to.
    pub fn storage_bucket(&self) -> String {
        self.storage_bucket
            .clone()
            .unwrap_or_else(|| format!("{}.appspot.com", self.project_id))
    }
}
