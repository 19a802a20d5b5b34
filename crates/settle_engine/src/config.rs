//! Configuration for the reconciliation engine.

/// Configuration for one synchronized data kind.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Label of the synchronized data kind, used in log lines.
    pub data_kind: String,
    /// Whether the upload step must fail when the snapshot's
    /// last-modified marker moved since download.
    ///
    /// On by default. Turn off only for stores whose markers are too
    /// coarse to compare reliably.
    pub require_unchanged_remote: bool,
}

impl SyncConfig {
    /// Creates a configuration for `data_kind`.
    pub fn new(data_kind: impl Into<String>) -> Self {
        Self {
            data_kind: data_kind.into(),
            require_unchanged_remote: true,
        }
    }

    /// Sets whether concurrent snapshot writers abort the cycle.
    pub fn with_require_unchanged_remote(mut self, require: bool) -> Self {
        self.require_unchanged_remote = require;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("filters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SyncConfig::new("drafts").with_require_unchanged_remote(false);
        assert_eq!(config.data_kind, "drafts");
        assert!(!config.require_unchanged_remote);
    }

    #[test]
    fn default_syncs_filters() {
        let config = SyncConfig::default();
        assert_eq!(config.data_kind, "filters");
        assert!(config.require_unchanged_remote);
    }
}
