//! Instrumented scaffolds for observing resolution

use scaffold_core::{async_trait, Node, ResolveError, Scaffold, Scope};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Resolves to a fixed value after a delay, counting every resolution
pub struct Counted<T> {
    value: T,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl<T> Counted<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            value,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared call counter, readable after the scaffold moved into a node
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn into_node(self) -> Node<T> {
        Node::nested(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for Counted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counted")
            .field("value", &self.value)
            .field("calls", &self.calls.load(Ordering::SeqCst))
            .finish()
    }
}

#[async_trait]
impl<T> Scaffold<T> for Counted<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    async fn resolve(&self, _scope: &Scope) -> Result<T, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.value.clone())
    }
}

/// Never completes; records when it is dropped mid-flight
#[derive(Debug, Default, Clone)]
pub struct Stalled {
    started: Arc<AtomicUsize>,
}

impl Stalled {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.started)
    }
}

#[async_trait]
impl<T> Scaffold<T> for Stalled
where
    T: Send + 'static,
{
    async fn resolve(&self, _scope: &Scope) -> Result<T, ResolveError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        futures::future::pending().await
    }
}
