//! Resolution scope
//!
//! A [`Scope`] travels down the node tree during resolution. It is cheap to
//! clone: the registry and configuration are shared, only the field path and
//! the current deferred owner are per-branch.

use crate::config::ResolveConfig;
use crate::error::ResolveError;
use crate::node::{Node, Ref};
use crate::path::{FieldPath, PathSegment};
use scaffold_registry::{Registry, RegistryError, RegistryKey};
use std::sync::Arc;
use tracing::Span;

/// Per-branch resolution context
#[derive(Debug, Clone)]
pub struct Scope {
    registry: Arc<Registry>,
    config: Arc<ResolveConfig>,
    path: FieldPath,
    /// Deferred entry whose initialization this branch belongs to
    owner: Option<RegistryKey>,
}

/// Failure inside a registry fetch
enum FetchError {
    Registry(RegistryError),
    Resolve(ResolveError),
}

impl From<RegistryError> for FetchError {
    fn from(error: RegistryError) -> Self {
        Self::Registry(error)
    }
}

impl Scope {
    /// Create root scope
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<Registry>, config: Arc<ResolveConfig>) -> Self {
        Self {
            registry,
            config,
            path: FieldPath::root(),
            owner: None,
        }
    }

    /// Get the shared registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Get the configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Get the current field path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Scope for a named field of the current entity
    #[must_use]
    pub fn field(&self, name: &'static str) -> Self {
        self.child(PathSegment::Field(name))
    }

    /// Scope for one element of a repeated or keyed field
    #[must_use]
    pub fn index(&self, idx: usize) -> Self {
        self.child(PathSegment::Index(idx))
    }

    fn child(&self, segment: PathSegment) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
            path: self.path.child(segment),
            owner: self.owner.clone(),
        }
    }

    /// Span for resolving one entity, or a disabled span
    #[must_use]
    pub fn entity_span(&self, entity: &'static str) -> Span {
        if self.config.span_per_entity {
            tracing::debug_span!("resolve", entity, path = %self.path)
        } else {
            Span::none()
        }
    }

    /// Fetch the value a reference names
    ///
    /// Completed entries answer immediately. A deferred entry is resolved
    /// once, under a scope owned by that entry, and cached; concurrent
    /// dereferences of the same key await that single resolution.
    ///
    /// # Errors
    /// - [`ResolveError::UnresolvedReference`] if nothing is registered
    /// - [`ResolveError::ReferenceCycle`] if deferred entries wait on each other
    /// - any error from resolving the deferred node
    pub async fn dereference<T>(&self, reference: &Ref<T>) -> Result<T, ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = reference.registry_key();
        let inner = Self {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
            path: self.path.child(PathSegment::Reference(key.to_string())),
            owner: Some(key.clone()),
        };

        let value = self
            .registry
            .fetch::<T, FetchError, _, _>(&key, self.owner.as_ref(), move |pending| async move {
                let node = pending
                    .downcast::<Node<T>>()
                    .map_err(|_| FetchError::Registry(RegistryError::TypeMismatch {
                        type_name: Ref::<T>::type_name(),
                        key: reference.key().to_string(),
                    }))?;
                tracing::trace!(entry = %inner.path, "resolving deferred reference");
                node.resolve(&inner).await.map_err(FetchError::Resolve)
            })
            .await
            .map_err(|e| match e {
                FetchError::Registry(error) => ResolveError::from_registry(error, &self.path),
                FetchError::Resolve(error) => error,
            })?;

        Ok(T::clone(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Auth {
        user: String,
    }

    fn root(registry: Registry) -> Scope {
        Scope::new(Arc::new(registry), Arc::new(ResolveConfig::default()))
    }

    #[test]
    fn child_scopes_extend_path() {
        let scope = root(Registry::new());
        let child = scope.field("jobs").index(2).field("name");
        assert_eq!(child.path().to_string(), "jobs[2].name");
        assert!(scope.path().is_root());
    }

    #[tokio::test]
    async fn unresolved_reference_carries_path() {
        let scope = root(Registry::new()).field("auth");
        let err = scope.dereference(&Ref::<Auth>::new("missing")).await.unwrap_err();
        match err {
            ResolveError::UnresolvedReference { type_name, key, path } => {
                assert_eq!(type_name, "Auth");
                assert_eq!(key, "missing");
                assert_eq!(path.to_string(), "auth");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn deferred_node_resolved_once() {
        let registry = Registry::new();
        registry
            .insert_deferred::<Auth, _>("ci", Node::literal(Auth { user: "bot".into() }))
            .unwrap();
        let scope = root(registry);

        let r = Ref::<Auth>::new("ci");
        assert_eq!(scope.dereference(&r).await.unwrap().user, "bot");
        assert_eq!(scope.dereference(&r).await.unwrap().user, "bot");

        let stats = scope.registry().stats();
        assert_eq!(stats.initializations, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn deferred_self_reference_is_cycle() {
        let registry = Registry::new();
        registry
            .insert_deferred::<Auth, _>("loop", Node::<Auth>::reference("loop"))
            .unwrap();
        let scope = root(registry);

        let err = scope.dereference(&Ref::<Auth>::new("loop")).await.unwrap_err();
        match err {
            ResolveError::ReferenceCycle { chain, path } => {
                assert_eq!(chain, vec!["Auth(\"loop\")", "Auth(\"loop\")"]);
                assert_eq!(path.to_string(), "->Auth(\"loop\")");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn spans_can_be_disabled() {
        let config = ResolveConfig::new().with_entity_spans(false);
        let scope = Scope::new(Arc::new(Registry::new()), Arc::new(config));
        assert!(scope.entity_span("Job").is_none());
    }
}
