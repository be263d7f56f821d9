//! Error types for theme resolution.
//!
//! Only structural problems and resource guards surface as [`ThemeError`].
//! Degraded input (malformed names, unmapped namespaces, dangling references,
//! unreadable imports) is absorbed and reported through the diagnostic lists
//! on [`ResolvedTheme`](crate::ResolvedTheme) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a resolution or extraction run.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The input carried no declarations at all, not even factory defaults.
    #[error("no declarations to resolve")]
    NoDeclarations,

    /// `@import` nesting went deeper than the configured ceiling.
    #[error("import depth {depth} exceeded while loading {}", path.display())]
    ImportDepthExceeded { path: PathBuf, depth: usize },

    /// Function-aware reference substitution did not settle.
    #[error("reference substitution in '{value}' did not settle after {iterations} iterations")]
    SubstitutionLimit { value: String, iterations: usize },

    /// Invalid engine configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// The entry stylesheet could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_yaml::Error> for ThemeError {
    fn from(err: serde_yaml::Error) -> Self {
        ThemeError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for theme operations.
pub type Result<T> = std::result::Result<T, ThemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_limit_display() {
        let err = ThemeError::SubstitutionLimit {
            value: "calc(var(--color-x))".to_string(),
            iterations: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("--color-x"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_import_depth_display() {
        let err = ThemeError::ImportDepthExceeded {
            path: PathBuf::from("deep.css"),
            depth: 16,
        };
        assert!(err.to_string().contains("deep.css"));
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{ not: a list }").unwrap_err();
        let err: ThemeError = yaml_err.into();
        assert!(matches!(err, ThemeError::Config { .. }));
    }
}
