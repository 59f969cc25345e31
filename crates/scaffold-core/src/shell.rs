//! Shells and the resolution trait
//!
//! Every generated entity gets a shell: an immutable snapshot holding one
//! node-typed slot per field. Single fields are `Option<Node<F>>`, repeated
//! fields `Vector<Node<F>>` and keyed fields `Vector<(Node<K>, Node<V>)>`.
//! Builders replace the shell wholesale on every call; the persistent
//! [`im::Vector`] keeps those copies cheap through structural sharing.

use crate::error::ResolveError;
use crate::node::Node;
use crate::scope::Scope;
use async_trait::async_trait;
use scaffold_registry::short_type_name;
use std::fmt;

/// Something that resolves into a `T`
///
/// Implemented by every shell (producing its entity) and by every union
/// shell (producing the union entity tagged with the present variant).
///
/// # Contract
/// - Resolution of independent complex fields runs concurrently; the entity
///   is assembled only after all of them completed
/// - The first failure is returned and sibling work is dropped
/// - The assembly step is pure
#[async_trait]
pub trait Scaffold<T>: Send + Sync + fmt::Debug {
    /// Resolve into the final value
    async fn resolve(&self, scope: &Scope) -> Result<T, ResolveError>;

    /// Name used in spans and diagnostics
    fn describe(&self) -> &'static str {
        short_type_name::<T>()
    }
}

/// Immutable per-entity snapshot of builder state
pub trait Shell: Clone + Send + Sync + fmt::Debug + 'static {
    /// The final model type this shell resolves into
    type Entity: Clone + Send + Sync + 'static;

    /// Entity name, as declared in the schema
    const ENTITY: &'static str;

    /// Turn the finished shell into the root node of its tree
    fn into_node(self) -> Node<Self::Entity>;
}
