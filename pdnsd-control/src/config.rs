//! Client configuration

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::grammar::Capabilities;

/// Name of the control socket inside the daemon's cache directory
pub const STATUS_SOCKET_NAME: &str = "pdnsd.status";

/// Cache directory used when none is given, overridable at build time
/// through `PDNSD_DEFAULT_CACHE_DIR`.
pub const DEFAULT_CACHE_DIR: &str = match option_env!("PDNSD_DEFAULT_CACHE_DIR") {
    Some(dir) => dir,
    None => "/var/cache/pdnsd",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    /// The daemon's cache directory, which holds the control socket
    pub cache_dir: PathBuf,
    /// Upper bound for a whole exchange; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Suppress the success message
    pub quiet: bool,
    pub capabilities: Capabilities,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            timeout: None,
            quiet: false,
            capabilities: Capabilities::compiled(),
        }
    }
}

impl ControlConfig {
    #[must_use]
    pub fn with_cache_dir(mut self, cache_dir: impl AsRef<Path>) -> Self {
        self.cache_dir = cache_dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Path of the daemon's control socket
    #[must_use]
    pub fn socket_path(&self) -> PathBuf {
        self.cache_dir.join(STATUS_SOCKET_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_socket_path() {
        let config = ControlConfig::default();
        assert_eq!(
            config.socket_path(),
            Path::new(DEFAULT_CACHE_DIR).join("pdnsd.status")
        );
        assert_eq!(config.timeout, None);
        assert!(!config.quiet);
    }

    #[test]
    fn test_cache_dir_override() {
        let config = ControlConfig::default()
            .with_cache_dir("/tmp/pdnsd-test")
            .with_timeout(Some(Duration::from_secs(3)))
            .with_quiet(true);
        assert_eq!(
            config.socket_path(),
            PathBuf::from("/tmp/pdnsd-test/pdnsd.status")
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
        assert!(config.quiet);
    }
}
