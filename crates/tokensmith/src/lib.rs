//! # Tokensmith - Design Tokens to Theme Trees
//!
//! `tokensmith` reads CSS custom properties (`--color-red-500: #ef4444`) and
//! folds them into a namespaced, nested theme (`colors.red.500`), with
//! selector-scoped variants, deletion semantics and conflict reporting.
//!
//! ## Core Concepts
//!
//! - [`Declaration`]: one custom-property assignment plus where it was written
//! - [`ThemeInput`]: the ordered declaration stream, rule overrides and keyframes
//! - [`Engine`]: runs the pipeline and owns the caches
//! - [`Theme`]: the built tree, addressed by [`ThemePath`]s
//! - [`Variant`]: a selector-scoped theme such as `.dark`
//! - [`Conflict`]: a literal style rule at odds with a variant's token value
//!
//! ## Quick Start
//!
//! ```rust
//! use tokensmith::{Declaration, Engine, ThemeInput};
//!
//! let input = ThemeInput::new(vec![
//!     Declaration::base("--color-red-500", "#ef4444"),
//!     Declaration::base("--color-background", "var(--bg)"),
//!     Declaration::root("--bg", "#fff"),
//! ]);
//!
//! let mut engine = Engine::default();
//! let resolved = engine.resolve(&input).unwrap();
//! assert_eq!(resolved.base.lookup("colors.red.500"), Some("#ef4444"));
//! assert_eq!(resolved.base.lookup("colors.background"), Some("#fff"));
//! ```
//!
//! ## From CSS
//!
//! ```rust
//! use tokensmith::Engine;
//!
//! let css = r#"
//! @theme {
//!   --color-surface: #fff;
//!   --color-text: #111;
//! }
//! .dark {
//!   --color-surface: #000;
//! }
//! "#;
//!
//! let resolved = Engine::default().resolve_css(css).unwrap();
//! let dark = resolved.variant("dark").unwrap();
//! assert_eq!(dark.theme.lookup("colors.surface"), Some("#000"));
//! assert_eq!(dark.theme.lookup("colors.text"), Some("#111"));
//! ```
//!
//! ## Deletion
//!
//! The value `initial` removes what the scope has accumulated so far.
//! `--color-red-*: initial` clears every `colors.red` entry written before
//! it; `--color-*: initial` clears all colors; `--*: initial` clears the
//! whole theme. Later declarations are unaffected.
//!
//! ## Diagnostics
//!
//! Degraded input never fails a run. Legacy names land in
//! [`ResolvedTheme::deprecations`], dangling references in
//! [`ResolvedTheme::unresolved`]. Only an empty input and the resource
//! guards ([`ThemeError::ImportDepthExceeded`],
//! [`ThemeError::SubstitutionLimit`]) are errors.

pub mod cache;
pub mod config;
pub mod conflict;
pub mod declaration;
pub mod engine;
pub mod error;
pub mod extract;
pub mod namespace;
pub mod resolve;
pub mod theme;
pub mod variant;

pub use cache::{CacheStats, ResolutionCache};
pub use config::{EngineConfig, BASE_SCOPE};
pub use conflict::{Complexity, Confidence, Conflict, ConflictDetector, RuleOverride};
pub use declaration::{Declaration, Keyframes, Origin, ThemeInput};
pub use engine::{Engine, ResolvedTheme};
pub use error::{Result, ThemeError};
pub use extract::{parse_css, FsLoader, MemoryLoader, SourceLoader};
pub use namespace::{
    parse_namespace_key, parse_nested_path, ConsecutiveDashes, Deprecation, NestingPolicies,
    NestingPolicy, OverflowMode, ParsedKey,
};
pub use theme::{FontSize, Theme, ThemeKey, ThemeNode, ThemePath, ThemeProperty, ThemeTree};
pub use variant::Variant;
