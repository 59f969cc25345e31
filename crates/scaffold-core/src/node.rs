//! Nodes of the intermediate tree
//!
//! A [`Node`] is the unit the whole pipeline operates on: a literal value, a
//! named reference into the [`Registry`](scaffold_registry::Registry), or a
//! nested unresolved shell.

use crate::error::ResolveError;
use crate::scope::Scope;
use crate::shell::Scaffold;
use futures::future::{BoxFuture, FutureExt};
use scaffold_registry::{short_type_name, RegistryKey};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::Instrument;

/// Typed lookup key for a registry entry
///
/// A `Ref` is a (type, string key) pair; it carries no value and does no
/// work until dereferenced during resolution.
pub struct Ref<T> {
    key: Arc<str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    /// Create reference to the `T` registered under `key`
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self {
            key: key.into(),
            _marker: PhantomData,
        }
    }

    /// Get the string key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Short name of the referenced type
    #[inline]
    #[must_use]
    pub fn type_name() -> &'static str {
        short_type_name::<T>()
    }
}

impl<T: 'static> Ref<T> {
    /// Registry key addressed by this reference
    #[inline]
    #[must_use]
    pub fn registry_key(&self) -> RegistryKey {
        RegistryKey::of::<T>(Arc::clone(&self.key))
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref<{}>({:?})", Self::type_name(), self.key)
    }
}

impl<T> fmt::Display for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", Self::type_name(), self.key)
    }
}

/// Value holder of the intermediate tree
///
/// Nested chains are never cyclic: a `Nested` payload is a finished shell
/// that can only contain shells built before it. Cycles are expressed
/// through `Reference`, which defers evaluation to the registry.
pub enum Node<T> {
    /// Already known value
    Literal(T),
    /// Value registered under a key, fetched at resolution time
    Reference(Ref<T>),
    /// Unresolved composite whose fields are themselves nodes
    Nested(Arc<dyn Scaffold<T>>),
}

impl<T> Node<T> {
    /// Wrap a known value
    #[inline]
    #[must_use]
    pub fn literal(value: T) -> Self {
        Self::Literal(value)
    }

    /// Refer to the `T` registered under `key`
    #[inline]
    #[must_use]
    pub fn reference(key: impl Into<Arc<str>>) -> Self {
        Self::Reference(Ref::new(key))
    }

    /// Wrap an unresolved shell
    #[inline]
    #[must_use]
    pub fn nested<S>(shell: S) -> Self
    where
        S: Scaffold<T> + 'static,
    {
        Self::Nested(Arc::new(shell))
    }

    /// Get the literal value, if this is a literal
    #[inline]
    #[must_use]
    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Get the reference, if this is a reference
    #[inline]
    #[must_use]
    pub fn as_reference(&self) -> Option<&Ref<T>> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Check if this node is a literal
    #[inline]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Check if this node is nested
    #[inline]
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

impl<T> Node<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Resolve this node into its final value
    ///
    /// # Errors
    /// Propagates the first failure anywhere below this node
    pub fn resolve<'a>(&'a self, scope: &'a Scope) -> BoxFuture<'a, Result<T, ResolveError>> {
        async move {
            match self {
                Self::Literal(value) => Ok(value.clone()),
                Self::Reference(r) => scope.dereference(r).await,
                Self::Nested(shell) => {
                    let span = scope.entity_span(shell.describe());
                    shell.resolve(scope).instrument(span).await
                }
            }
        }
        .boxed()
    }
}

impl<T> From<Ref<T>> for Node<T> {
    fn from(r: Ref<T>) -> Self {
        Self::Reference(r)
    }
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Reference(r) => Self::Reference(r.clone()),
            Self::Nested(shell) => Self::Nested(Arc::clone(shell)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Reference(r) => f.debug_tuple("Reference").field(r).finish(),
            Self::Nested(shell) => f.debug_tuple("Nested").field(shell).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolveConfig;
    use scaffold_registry::Registry;

    #[derive(Debug, Clone, PartialEq)]
    struct Auth {
        user: String,
    }

    fn scope(registry: Registry) -> Scope {
        Scope::new(Arc::new(registry), Arc::new(ResolveConfig::default()))
    }

    #[test]
    fn ref_identity() {
        let a: Ref<Auth> = Ref::new("ci");
        let b: Ref<Auth> = Ref::new(String::from("ci"));
        assert_eq!(a, b);
        assert_eq!(a.key(), "ci");
        assert_eq!(a.to_string(), "Auth(\"ci\")");
        assert_eq!(format!("{a:?}"), "Ref<Auth>(\"ci\")");
        assert_eq!(a.registry_key(), RegistryKey::of::<Auth>("ci"));
    }

    #[test]
    fn node_variants() {
        let lit = Node::literal(3u32);
        assert!(lit.is_literal());
        assert_eq!(lit.as_literal(), Some(&3));

        let r: Node<u32> = Node::reference("three");
        assert!(!r.is_literal());
        assert_eq!(r.as_reference().map(Ref::key), Some("three"));

        let from_ref: Node<u32> = Ref::new("four").into();
        assert!(from_ref.as_reference().is_some());
    }

    #[tokio::test]
    async fn literal_resolves_to_itself() {
        let scope = scope(Registry::new());
        let node = Node::literal(String::from("x"));
        assert_eq!(node.resolve(&scope).await.unwrap(), "x");
        assert_eq!(node.resolve(&scope).await.unwrap(), "x");
    }

    #[tokio::test]
    async fn reference_resolves_from_registry() {
        let registry = Registry::new();
        registry.insert("ci", Auth { user: "bot".into() }).unwrap();
        let scope = scope(registry);

        let node: Node<Auth> = Node::reference("ci");
        assert_eq!(node.resolve(&scope).await.unwrap().user, "bot");
    }

    #[tokio::test]
    async fn missing_reference_fails() {
        let scope = scope(Registry::new());
        let node: Node<Auth> = Node::reference("missing");
        let err = node.resolve(&scope).await.unwrap_err();
        assert!(err.is_unresolved_reference());
    }

    #[test]
    fn clone_keeps_literal() {
        let node: Node<u32> = Node::literal(1);
        let copy = node.clone();
        assert_eq!(copy.as_literal(), Some(&1));
        assert_eq!(format!("{copy:?}"), "Literal(1)");
    }
}
