//! Scaffold Core
//!
//! Two-phase materialization of typed entities:
//!
//! 1. **Build**: a [`Spec`] runs synchronously against a [`Builder`],
//!    accumulating an immutable [`Shell`] whose fields are [`Node`]s
//!    (literal values, named [`Ref`]erences, or nested shells).
//! 2. **Resolve**: the node tree is walked concurrently and turned into the
//!    final entity. References are looked up in the run's
//!    [`Registry`](scaffold_registry::Registry); deferred entries are
//!    resolved at most once.
//!
//! # Core Concepts
//!
//! - [`Builder`]: per-entity accumulation surface carrying a context value;
//!   `include_with` / `include_for_each` run instructions under another
//!   context and keep the result
//! - [`Spec`] and [`Scaffolder`]: reusable instructions, and anything that
//!   turns a context into a shell (union specs dispatch on their variant)
//! - [`Scaffold`]: async resolution of a shell into its entity
//! - [`Resolver`]: host entry point owning registry and [`ResolveConfig`]
//!
//! # Example
//!
//! ```rust
//! use scaffold_core::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Greeting {
//!     text: String,
//! }
//!
//! #[derive(Debug, Clone, Default)]
//! struct GreetingShell {
//!     text: Option<Node<String>>,
//! }
//!
//! #[async_trait]
//! impl Scaffold<Greeting> for GreetingShell {
//!     async fn resolve(&self, scope: &Scope) -> Result<Greeting, ResolveError> {
//!         let text = resolve_required(self.text.as_ref(), scope, Self::ENTITY, "text").await?;
//!         Ok(Greeting { text })
//!     }
//! }
//!
//! impl Shell for GreetingShell {
//!     type Entity = Greeting;
//!     const ENTITY: &'static str = "Greeting";
//!
//!     fn into_node(self) -> Node<Greeting> {
//!         Node::nested(self)
//!     }
//! }
//!
//! let spec = Spec::<GreetingShell, &'static str>::new(|b| {
//!     let text = format!("hello {}", b.context());
//!     b.update(|mut s| {
//!         s.text = Some(Node::literal(text));
//!         s
//!     });
//! });
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let greeting = Resolver::new().resolve_spec(&spec, "world").await.unwrap();
//! assert_eq!(greeting.text, "hello world");
//! # });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod builder;
mod config;
mod error;
mod node;
mod path;
mod resolve;
mod resolver;
mod scope;
mod shell;
mod spec;

// Re-exports
pub use builder::Builder;
pub use config::ResolveConfig;
pub use error::{ConfigError, ResolveError};
pub use node::{Node, Ref};
pub use path::{FieldPath, PathSegment};
pub use resolve::{
    resolve_all, resolve_entries, resolve_optional, resolve_required, resolve_variant, select_variant,
};
pub use resolver::Resolver;
pub use scope::Scope;
pub use shell::{Scaffold, Shell};
pub use spec::{Scaffolder, Spec};

pub use scaffold_registry::{Registry, RegistryError, RegistryKey, RegistryStats};

// Used by generated shells
pub use async_trait::async_trait;
pub use im::Vector;
pub use indexmap::IndexMap;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for spec authors and generated code
pub mod prelude {
    pub use crate::{
        async_trait, resolve_all, resolve_entries, resolve_optional, resolve_required,
        resolve_variant, select_variant, Builder, IndexMap, Node, Ref, ResolveConfig, ResolveError,
        Resolver, Scaffold, Scaffolder, Scope, Shell, Spec, Vector,
    };
}
