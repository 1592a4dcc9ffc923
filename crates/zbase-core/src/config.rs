//! Client configuration

use serde::{Deserialize, Serialize};

use crate::auth::DigestStrategy;
use crate::constants::{DEFAULT_MAX_ITEM_BYTES, DEFAULT_MAX_PAGE_BYTES, MAX_MESSAGE_BYTES};
use crate::error::Error;

/// Version this client reports to the service's compatibility check
pub const CLIENT_VERSION: &str = "0.1.0";

/// Settings for one client instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `http://localhost:9443`
    pub server_url: String,
    /// User the client acts as
    #[serde(default)]
    pub user_id: String,
    /// Parent of a sub-user; empty for top-level users
    #[serde(default)]
    pub parent_id: String,
    /// Expected upper bound of one stored value, sizes read pages
    #[serde(default = "default_max_item_bytes")]
    pub max_item_bytes: u64,
    /// Byte ceiling of one multi-put page
    #[serde(default = "default_max_page_bytes")]
    pub max_page_bytes: u64,
    #[serde(default)]
    pub multi_put_digest: DigestStrategy,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_item_bytes() -> u64 {
    DEFAULT_MAX_ITEM_BYTES
}

fn default_max_page_bytes() -> u64 {
    DEFAULT_MAX_PAGE_BYTES
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            user_id: String::new(),
            parent_id: String::new(),
            max_item_bytes: default_max_item_bytes(),
            max_page_bytes: default_max_page_bytes(),
            multi_put_digest: DigestStrategy::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }

    /// Set read and write page sizing
    pub fn with_page_limits(mut self, max_item_bytes: u64, max_page_bytes: u64) -> Self {
        self.max_item_bytes = max_item_bytes;
        self.max_page_bytes = max_page_bytes;
        self
    }

    pub fn with_digest(mut self, strategy: DigestStrategy) -> Self {
        self.multi_put_digest = strategy;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Keys fetched per read page
    pub fn items_per_page(&self) -> usize {
        (self.max_page_bytes / self.max_item_bytes.max(1)).max(1) as usize
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.server_url.is_empty() {
            return Err(Error::InvalidConfig("server_url is empty".to_string()));
        }
        if self.max_item_bytes == 0 || self.max_page_bytes == 0 {
            return Err(Error::InvalidConfig(
                "page limits must be non-zero".to_string(),
            ));
        }
        if self.max_page_bytes > MAX_MESSAGE_BYTES {
            return Err(Error::InvalidConfig(format!(
                "max_page_bytes {} exceeds message limit {}",
                self.max_page_bytes, MAX_MESSAGE_BYTES
            )));
        }
        if self.max_item_bytes > self.max_page_bytes {
            return Err(Error::InvalidConfig(format!(
                "max_item_bytes {} exceeds max_page_bytes {}",
                self.max_item_bytes, self.max_page_bytes
            )));
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
