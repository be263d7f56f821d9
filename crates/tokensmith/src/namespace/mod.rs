//! Namespace and key parsing.
//!
//! A declaration name such as `--color-red-500` is read in two steps:
//!
//! 1. [`parse_namespace_key`] splits it into the namespace (`color`) and the
//!    key (`red-500`), recognizing two-token namespaces and legacy singular
//!    names.
//! 2. [`parse_nested_path`] splits the key into path segments (`red`, `500`)
//!    under the namespace's [`NestingPolicy`].
//!
//! The namespace itself is dispatched through a static table
//! ([`namespace_target`]) to a theme sub-tree and a [`Writer`].

mod key;
mod path;
mod table;

pub use key::{parse_namespace_key, Deprecation, ParsedName, MARKER, SINGULAR_KEY};
pub use path::{
    camel_case, parse_nested_path, ConsecutiveDashes, NestingPolicies, NestingPolicy,
    OverflowMode, ParsedKey,
};
pub use table::{namespace_for, namespace_target, NamespaceTarget, Writer};
