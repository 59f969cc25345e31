//! Resolution driver
//!
//! [`Resolver`] is the host-facing entry point: it owns the run's registry
//! and configuration, registers values and deferred nodes, and turns root
//! nodes into final values under the optional deadline.

use crate::config::ResolveConfig;
use crate::error::ResolveError;
use crate::node::Node;
use crate::scope::Scope;
use crate::shell::Shell;
use crate::spec::Scaffolder;
use scaffold_registry::{Registry, RegistryStats};
use std::sync::Arc;
use std::time::Instant;

/// Registry-backed resolver for one run
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    registry: Arc<Registry>,
    config: Arc<ResolveConfig>,
}

impl Resolver {
    /// Create resolver with an empty registry and default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With shared registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: ResolveConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Get the registry
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

    /// Registry statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Root scope for resolving by hand
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::new(Arc::clone(&self.registry), Arc::clone(&self.config))
    }

    /// Register a completed value under `key`
    ///
    /// # Errors
    /// Returns [`ResolveError::Registry`] if the key is taken
    pub fn register<T>(&self, key: impl Into<Arc<str>>, value: T) -> Result<(), ResolveError>
    where
        T: Send + Sync + 'static,
    {
        Ok(self.registry.insert(key, value)?)
    }

    /// Register a node to be resolved on first dereference
    ///
    /// # Errors
    /// Returns [`ResolveError::Registry`] if the key is taken
    pub fn register_node<T>(&self, key: impl Into<Arc<str>>, node: Node<T>) -> Result<(), ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        Ok(self.registry.insert_deferred::<T, _>(key, node)?)
    }

    /// Resolve a root node
    ///
    /// # Errors
    /// - [`ResolveError::DeadlineExceeded`] if a deadline is configured and
    ///   elapses first; in-flight work is dropped
    /// - the first failure anywhere in the tree
    pub async fn resolve<T>(&self, node: &Node<T>) -> Result<T, ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let scope = self.scope();
        let started = Instant::now();
        let work = node.resolve(&scope);

        let result = match self.config.deadline_ms {
            Some(deadline_ms) => {
                let deadline = std::time::Duration::from_millis(deadline_ms);
                tokio::time::timeout(deadline, work)
                    .await
                    .unwrap_or(Err(ResolveError::DeadlineExceeded { deadline_ms }))
            }
            None => work.await,
        };

        match &result {
            Ok(_) => tracing::debug!(elapsed = ?started.elapsed(), "resolved"),
            Err(error) => tracing::debug!(%error, elapsed = ?started.elapsed(), "resolution failed"),
        }
        result
    }

    /// Build a spec under `context` and resolve the result
    ///
    /// # Errors
    /// See [`resolve`](Self::resolve)
    pub async fn resolve_spec<P, C>(
        &self,
        spec: &P,
        context: C,
    ) -> Result<<P::Shell as Shell>::Entity, ResolveError>
    where
        P: Scaffolder<C> + ?Sized,
    {
        let node = spec.create_node(context);
        self.resolve(&node).await
    }

    /// Resolve a node and register the value under `key`
    ///
    /// # Errors
    /// - any failure of [`resolve`](Self::resolve)
    /// - [`ResolveError::Registry`] if the key is taken
    pub async fn resolve_and_register<T>(
        &self,
        key: impl Into<Arc<str>>,
        node: &Node<T>,
    ) -> Result<T, ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let value = self.resolve(node).await?;
        self.registry.insert(key, value.clone())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Scaffold;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Auth {
        user: String,
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl Scaffold<Auth> for Stalled {
        async fn resolve(&self, _scope: &Scope) -> Result<Auth, ResolveError> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn register_then_resolve_reference() {
        let resolver = Resolver::new();
        resolver.register("ci", Auth { user: "bot".into() }).unwrap();

        let auth = resolver.resolve(&Node::<Auth>::reference("ci")).await.unwrap();
        assert_eq!(auth.user, "bot");
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let resolver = Resolver::new();
        resolver.register("ci", Auth { user: "a".into() }).unwrap();
        let err = resolver.register("ci", Auth { user: "b".into() }).unwrap_err();
        assert!(matches!(err, ResolveError::Registry { .. }));

        let auth = resolver.resolve(&Node::<Auth>::reference("ci")).await.unwrap();
        assert_eq!(auth.user, "a");
    }

    #[tokio::test]
    async fn resolve_and_register_publishes_value() {
        let resolver = Resolver::new();
        let value = resolver
            .resolve_and_register("main", &Node::literal(Auth { user: "root".into() }))
            .await
            .unwrap();
        assert_eq!(value.user, "root");
        assert_eq!(
            resolver.registry().get::<Auth>("main").map(|a| a.user.clone()),
            Some("root".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_exceeded() {
        let resolver = Resolver::new().with_config(ResolveConfig::new().with_deadline(Duration::from_millis(50)));
        let err = resolver.resolve(&Node::nested(Stalled)).await.unwrap_err();
        assert_eq!(err, ResolveError::DeadlineExceeded { deadline_ms: 50 });
    }

    #[tokio::test]
    async fn shared_registry_across_resolvers() {
        let registry = Arc::new(Registry::new());
        let first = Resolver::new().with_registry(Arc::clone(&registry));
        let second = Resolver::new().with_registry(registry);

        first
            .register_node("lazy", Node::literal(Auth { user: "x".into() }))
            .unwrap();
        let auth = second.resolve(&Node::<Auth>::reference("lazy")).await.unwrap();
        assert_eq!(auth.user, "x");
        assert_eq!(first.stats().initializations, 1);
    }
}
