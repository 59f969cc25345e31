//! Scaffold Registry
//!
//! Run-scoped, concurrency-safe store of resolved values keyed by
//! (type, string key).
//!
//! # Core Concepts
//!
//! - [`Registry`]: write-once store with completed and deferred entries
//! - [`RegistryKey`]: type-aware key; the same string may name values of
//!   different types
//! - [`RegistryStats`]: hit / initialization counters for monitoring
//!
//! A completed entry answers every fetch in O(1). A deferred entry holds a
//! pending payload that is turned into a value by the first fetch, at most
//! once; concurrent fetches await that single initialization. Deferred
//! entries that wait on each other are reported as [`RegistryError::Cycle`].
//!
//! # Example
//!
//! ```rust
//! use scaffold_registry::Registry;
//!
//! #[derive(Debug, PartialEq)]
//! struct Auth {
//!     user: String,
//! }
//!
//! let registry = Registry::new();
//! registry.insert("ci", Auth { user: "bot".into() }).unwrap();
//!
//! assert!(registry.contains::<Auth>("ci"));
//! assert_eq!(registry.get::<Auth>("ci").unwrap().user, "bot");
//! assert!(registry.insert("ci", Auth { user: "other".into() }).is_err());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod key;
mod registry;
mod wait_graph;

// Re-exports
pub use error::RegistryError;
pub use key::{short_type_name, RegistryKey};
pub use registry::{Erased, Registry, RegistryStats};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
