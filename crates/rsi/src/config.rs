//! Runtime configuration for the catalog client.

use std::path::PathBuf;

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_DIRECTORY: &str = "./cache";

/// Configuration supplied by the host when constructing a
/// [`CatalogService`](crate::CatalogService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the on-disk cache.
    pub cache_directory: PathBuf,
    /// Log at debug level instead of info.
    pub debug_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            debug_logging: false,
        }
    }
}

impl Config {
    /// Set the cache root.
    #[must_use]
    pub fn with_cache_directory(mut self, cache_directory: impl Into<PathBuf>) -> Self {
        self.cache_directory = cache_directory.into();
        self
    }

    /// Enable or disable debug logging.
    #[must_use]
    pub fn with_debug_logging(mut self, debug_logging: bool) -> Self {
        self.debug_logging = debug_logging;
        self
    }

    /// Default level for the log filter when `RUST_LOG` is not set.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.debug_logging { "debug" } else { "info" }
    }
}
