//! Turning stylesheets into a [`ThemeInput`].
//!
//! The engine itself only consumes the declaration stream. This module is
//! the default producer: it inlines `@import`s through a [`SourceLoader`],
//! then walks the sheet with `cssparser`.
//!
//! ```rust
//! use tokensmith::extract::parse_css;
//!
//! let input = parse_css(".dark { --color-bg: #000; }");
//! assert_eq!(input.declarations[0].variant_id.as_deref(), Some("dark"));
//! ```

mod css_parser;
mod loader;

use std::path::Path;

pub use css_parser::{parse_css, variant_id_for};
pub use loader::{
    find_imports, inline_imports, FsLoader, ImportRule, MemoryLoader, SourceLoader,
    MAX_IMPORT_DEPTH,
};

use crate::declaration::ThemeInput;
use crate::error::{Result, ThemeError};

/// Loads `path`, inlines its imports and parses the result.
pub fn load_entry(path: &Path, loader: &dyn SourceLoader) -> Result<ThemeInput> {
    let source = loader.load(path).map_err(|source| ThemeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let css = inline_imports(path, &source, loader)?;
    Ok(parse_css(&css))
}
