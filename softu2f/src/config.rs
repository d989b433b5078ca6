//! Helper configuration

use crate::keystore::{UpCallback, UpResult, DEFAULT_NAMESPACE};

use softu2f_transport::DEFAULT_MAX_INPUT;

use std::path::PathBuf;
use std::sync::Arc;

/// Directory under `$HOME` holding the file key store
const STORE_DIR_NAME: &str = ".softu2f";

/// How signing requests answer the user presence check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PresencePolicy {
    /// Approve every request
    #[default]
    Accept,
    /// Refuse every request
    Deny,
}

impl PresencePolicy {
    pub fn callback(self) -> UpCallback {
        match self {
            PresencePolicy::Accept => Arc::new(|operation| {
                log::debug!("presence accepted for {}", operation);
                UpResult::Accepted
            }),
            PresencePolicy::Deny => Arc::new(|operation| {
                log::debug!("presence denied for {}", operation);
                UpResult::Denied
            }),
        }
    }
}

/// Helper configuration
///
/// # Example
///
/// ```
/// use softu2f::{HelperConfig, PresencePolicy};
///
/// let config = HelperConfig::builder()
///     .namespace("SoftU2F Tests")
///     .presence(PresencePolicy::Deny)
///     .build();
/// assert_eq!(config.max_input_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// Largest request body accepted, in bytes
    pub max_input_size: u32,

    /// Key store scope; keys in other namespaces are invisible
    pub namespace: String,

    /// Root of the file key store
    pub store_dir: PathBuf,

    pub presence: PresencePolicy,
}

/// `$HOME/.softu2f`, or `.softu2f` in the working directory without a home
pub fn default_store_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(STORE_DIR_NAME)
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT,
            namespace: DEFAULT_NAMESPACE.to_string(),
            store_dir: default_store_dir(),
            presence: PresencePolicy::default(),
        }
    }
}

impl HelperConfig {
    pub fn builder() -> HelperConfigBuilder {
        HelperConfigBuilder::new()
    }
}

/// Builder for [`HelperConfig`]
#[derive(Debug)]
pub struct HelperConfigBuilder {
    config: HelperConfig,
}

impl HelperConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HelperConfig::default(),
        }
    }

    pub fn max_input_size(mut self, max: u32) -> Self {
        self.config.max_input_size = max;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.store_dir = dir.into();
        self
    }

    pub fn presence(mut self, presence: PresencePolicy) -> Self {
        self.config.presence = presence;
        self
    }

    pub fn build(self) -> HelperConfig {
        self.config
    }
}

impl Default for HelperConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
