//! # Storage Configuration
//!
//! Tuning knobs for sparse set allocation, loaded once at startup.
//!
//! ```toml
//! sparse_block_size = 256
//! dense_capacity = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Default alignment block for the sparse index.
pub const DEFAULT_SPARSE_BLOCK_SIZE: usize = 256;

/// Default initial reservation for dense storage.
pub const DEFAULT_DENSE_CAPACITY: usize = 256;

/// Allocation settings applied to every sparse set a registry creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// The sparse index starts at this length and always grows to the next
    /// multiple of it.
    pub sparse_block_size: usize,
    /// Number of entries reserved up front in the dense arrays.
    pub dense_capacity: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            sparse_block_size: DEFAULT_SPARSE_BLOCK_SIZE,
            dense_capacity: DEFAULT_DENSE_CAPACITY,
        }
    }
}

impl EcsConfig {
    /// Checks that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `sparse_block_size` is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.sparse_block_size == 0 {
            return Err(EcsError::InvalidConfig(
                "sparse_block_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigParse`] on malformed TOML and
    /// [`EcsError::InvalidConfig`] if validation fails.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigIo`] if the file cannot be read, otherwise
    /// the same errors as [`EcsConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Rounds `n` up to the next multiple of the sparse block size.
    #[inline]
    #[must_use]
    pub const fn aligned_capacity(&self, n: usize) -> usize {
        n.div_ceil(self.sparse_block_size) * self.sparse_block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EcsConfig::default();
        assert_eq!(config.sparse_block_size, 256);
        assert_eq!(config.dense_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_aligned_capacity() {
        let config = EcsConfig::default();
        assert_eq!(config.aligned_capacity(0), 0);
        assert_eq!(config.aligned_capacity(1), 256);
        assert_eq!(config.aligned_capacity(256), 256);
        assert_eq!(config.aligned_capacity(257), 512);
        assert_eq!(config.aligned_capacity(300), 512);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EcsConfig::from_toml_str("sparse_block_size = 64").unwrap();
        assert_eq!(config.sparse_block_size, 64);
        assert_eq!(config.dense_capacity, DEFAULT_DENSE_CAPACITY);
    }

    #[test]
    fn test_from_toml_rejects_zero_block() {
        let err = EcsConfig::from_toml_str("sparse_block_size = 0").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let err = EcsConfig::from_toml_str("sparse_block_size = \"big\"").unwrap_err();
        assert!(matches!(err, EcsError::ConfigParse(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = EcsConfig::from_toml_file("/nonexistent/strata.toml").unwrap_err();
        assert!(matches!(err, EcsError::ConfigIo(_)));
    }
}
