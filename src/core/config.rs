//! Runtime configuration for bin stores.
//!
//! Configuration can be built in code, or loaded from a `.toml` or `.json`
//! file. Every loaded configuration is validated before use.

use crate::core::constants::DEFAULT_PREFETCH_SIZE;
use crate::core::error::{BinError, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on the histogram prefetch lookahead.
const MAX_PREFETCH_DISTANCE: usize = 1024;

/// Tuning knobs shared by every bin store created from the same config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinStoreConfig {
    /// Rows of lookahead for software prefetch during histogram construction
    /// (0 disables prefetching)
    pub prefetch_distance: usize,
    /// Worker threads for parallel staging (0 uses every available core)
    pub num_threads: usize,
    /// Check every row offset for monotonicity when loading a persisted store
    pub validate_offsets: bool,
}

impl Default for BinStoreConfig {
    fn default() -> Self {
        BinStoreConfig {
            prefetch_distance: DEFAULT_PREFETCH_SIZE,
            num_threads: 0,
            validate_offsets: false,
        }
    }
}

impl BinStoreConfig {
    /// Validate all parameters
    pub fn validate(&self) -> Result<()> {
        if self.prefetch_distance > MAX_PREFETCH_DISTANCE {
            return Err(BinError::invalid_parameter(
                "prefetch_distance",
                self.prefetch_distance.to_string(),
                format!("must be at most {}", MAX_PREFETCH_DISTANCE),
            ));
        }

        let cores = num_cpus::get();
        if self.num_threads > cores * 4 {
            log::warn!(
                "num_threads ({}) is much larger than available CPU cores ({})",
                self.num_threads,
                cores
            );
        }

        Ok(())
    }

    /// Number of worker threads to actually use
    pub fn effective_num_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }

    /// Build a dedicated rayon pool when a thread count is configured.
    ///
    /// Returns `None` when the global pool should be used.
    pub fn thread_pool(&self) -> Result<Option<rayon::ThreadPool>> {
        if self.num_threads == 0 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map(Some)
            .map_err(|e| BinError::config(format!("Failed to build thread pool: {}", e)))
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BinError::config(format!("Failed to read config file: {}", e)))?;

        let config: BinStoreConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| BinError::config(format!("Failed to parse JSON config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| BinError::config(format!("Failed to parse TOML config: {}", e)))?,
            _ => {
                return Err(BinError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| BinError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(BinError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| BinError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
