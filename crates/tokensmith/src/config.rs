//! Engine configuration.
//!
//! Configuration is plain serde data and usually lives in a YAML file next
//! to the stylesheet:
//!
//! ```yaml
//! nesting:
//!   shadow:
//!     max-depth: 1
//!     overflow: literal
//! overrides:
//!   base:
//!     colors.primary: "#2563eb"
//!   dark:
//!     colors.surface: "#0b0b0f"
//! cache:
//!   index-capacity: 32
//! auto-apply: false
//! ```
//!
//! Every section is optional. `overrides` is keyed by scope, either
//! [`BASE_SCOPE`] or a variant id, then by dotted theme path.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_INDEX_CAPACITY, DEFAULT_KEY_CAPACITY};
use crate::error::{Result, ThemeError};
use crate::namespace::NestingPolicies;
use crate::theme::ThemePath;

/// Scope name addressing the base theme in [`EngineConfig::overrides`].
pub const BASE_SCOPE: &str = "base";

/// Cache capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CacheConfig {
    pub index_capacity: usize,
    pub key_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            index_capacity: DEFAULT_INDEX_CAPACITY,
            key_capacity: DEFAULT_KEY_CAPACITY,
        }
    }
}

/// Manual values, scope → theme path → value.
pub type Overrides = IndexMap<String, IndexMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    pub nesting: NestingPolicies,
    pub overrides: Overrides,
    pub cache: CacheConfig,
    /// Write high-confidence conflict values back into variant themes.
    pub auto_apply: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nesting: NestingPolicies::new(),
            overrides: Overrides::new(),
            cache: CacheConfig::default(),
            auto_apply: true,
        }
    }
}

impl EngineConfig {
    /// Parses and validates YAML configuration.
    ///
    /// ```rust
    /// use tokensmith::EngineConfig;
    ///
    /// let config = EngineConfig::from_yaml("auto-apply: false").unwrap();
    /// assert!(!config.auto_apply);
    /// assert_eq!(config.cache.index_capacity, 64);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads [`from_yaml`](Self::from_yaml) input from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Checks that every override path addresses a theme value and that
    /// cache capacities are non-zero.
    pub fn validate(&self) -> Result<()> {
        for (scope, values) in &self.overrides {
            for path in values.keys() {
                if ThemePath::parse(path).is_none() {
                    return Err(ThemeError::Config {
                        message: format!(
                            "override '{}' in scope '{}' is not a theme path",
                            path, scope
                        ),
                    });
                }
            }
        }
        if self.cache.index_capacity == 0 || self.cache.key_capacity == 0 {
            return Err(ThemeError::Config {
                message: "cache capacities must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Override values for `scope`, with parsed paths.
    pub fn overrides_for(&self, scope: &str) -> Vec<(ThemePath, &str)> {
        self.overrides
            .get(scope)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|(path, value)| Some((ThemePath::parse(path)?, value.as_str())))
                    .collect()
            })
            .unwrap_or_default()
    }
}
