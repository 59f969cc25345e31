//! Field-level resolution helpers
//!
//! Generated shells resolve their fields with these functions. Complex
//! fields are joined concurrently (`futures::try_join!`) and simple fields
//! resolved inline afterwards:
//!
//! ```rust,ignore
//! let (auth, steps) = futures::try_join!(
//!     resolve_optional(self.auth.as_ref(), scope, "auth"),
//!     resolve_all(&self.steps, scope, "steps"),
//! )?;
//! let name = resolve_required(self.name.as_ref(), scope, Self::ENTITY, "name").await?;
//! ```
//!
//! Collections fan out over their elements with at most
//! [`ResolveConfig::max_concurrency`](crate::ResolveConfig) in flight and are
//! reassembled in their original order, whatever order elements finish in.
//! The first element to fail ends the whole collection and drops the rest.

use crate::error::ResolveError;
use crate::node::Node;
use crate::scope::Scope;
use crate::shell::Scaffold;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use im::Vector;
use indexmap::IndexMap;
use std::hash::Hash;

/// Resolve an optional single field
///
/// # Errors
/// Propagates the failure of the field's node
pub async fn resolve_optional<T>(
    node: Option<&Node<T>>,
    scope: &Scope,
    field: &'static str,
) -> Result<Option<T>, ResolveError>
where
    T: Clone + Send + Sync + 'static,
{
    match node {
        Some(node) => {
            let scope = scope.field(field);
            node.resolve(&scope).await.map(Some)
        }
        None => Ok(None),
    }
}

/// Resolve a required single field
///
/// # Errors
/// - [`ResolveError::MissingField`] if the spec never set the field
/// - the failure of the field's node
pub async fn resolve_required<T>(
    node: Option<&Node<T>>,
    scope: &Scope,
    entity: &'static str,
    field: &'static str,
) -> Result<T, ResolveError>
where
    T: Clone + Send + Sync + 'static,
{
    let scope = scope.field(field);
    match node {
        Some(node) => node.resolve(&scope).await,
        None => Err(ResolveError::MissingField {
            entity,
            field,
            path: scope.path().clone(),
        }),
    }
}

/// Resolve a repeated field, preserving element order
///
/// # Errors
/// Propagates the first element failure
pub fn resolve_all<'a, T>(
    nodes: &'a Vector<Node<T>>,
    scope: &'a Scope,
    field: &'static str,
) -> BoxFuture<'a, Result<Vec<T>, ResolveError>>
where
    T: Clone + Send + Sync + 'static,
{
    async move {
        let scope = scope.field(field);
        let mut pending: Vec<BoxFuture<'a, Result<T, ResolveError>>> = Vec::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            let element = scope.index(idx);
            pending.push(async move { node.resolve(&element).await }.boxed());
        }

        join_ordered(pending, scope.config().max_concurrency()).await
    }
    .boxed()
}

/// Resolve a keyed field into an insertion-ordered map
///
/// Pairs are kept positionally until here. When a key occurs more than once
/// the last occurrence supplies the value and the first keeps the position.
///
/// # Errors
/// Propagates the first key or value failure
pub fn resolve_entries<'a, K, V>(
    pairs: &'a Vector<(Node<K>, Node<V>)>,
    scope: &'a Scope,
    field: &'static str,
) -> BoxFuture<'a, Result<IndexMap<K, V>, ResolveError>>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async move {
        let scope = scope.field(field);
        let mut pending: Vec<BoxFuture<'a, Result<(K, V), ResolveError>>> = Vec::with_capacity(pairs.len());
        for (idx, (key, value)) in pairs.iter().enumerate() {
            let entry = scope.index(idx);
            let key_scope = entry.field("key");
            let value_scope = entry.field("value");
            pending.push(
                async move { futures::try_join!(key.resolve(&key_scope), value.resolve(&value_scope)) }.boxed(),
            );
        }

        let resolved = join_ordered(pending, scope.config().max_concurrency()).await?;

        let mut map = IndexMap::with_capacity(resolved.len());
        for (key, value) in resolved {
            if map.insert(key, value).is_some() {
                tracing::trace!(field = %scope.path(), "duplicate key, last value wins");
            }
        }
        Ok(map)
    }
    .boxed()
}

/// Run futures with at most `limit` in flight, returning results in input order
///
/// Results are slotted by index as they complete, so the first failure ends
/// the join even while earlier elements are still pending. Dropping the set
/// of running futures cancels the rest.
async fn join_ordered<'a, T>(
    pending: Vec<BoxFuture<'a, Result<T, ResolveError>>>,
    limit: usize,
) -> Result<Vec<T>, ResolveError>
where
    T: Send + 'a,
{
    let limit = limit.max(1);
    let mut slots: Vec<Option<T>> = Vec::with_capacity(pending.len());
    slots.resize_with(pending.len(), || None);

    let mut queued = pending.into_iter().enumerate();
    let mut running = FuturesUnordered::new();
    loop {
        while running.len() < limit {
            let Some((idx, fut)) = queued.next() else {
                break;
            };
            running.push(indexed(idx, fut));
        }

        match running.next().await {
            Some((idx, Ok(value))) => slots[idx] = Some(value),
            Some((_, Err(err))) => return Err(err),
            None => break,
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

fn indexed<'a, T>(
    idx: usize,
    fut: BoxFuture<'a, Result<T, ResolveError>>,
) -> BoxFuture<'a, (usize, Result<T, ResolveError>)>
where
    T: Send + 'a,
{
    async move { (idx, fut.await) }.boxed()
}

/// Resolve the present variant of a union and tag the result
///
/// # Errors
/// Propagates the failure of the variant's shell
pub async fn resolve_variant<S, E, U>(
    shell: &S,
    scope: &Scope,
    variant: &'static str,
    tag: impl FnOnce(E) -> U + Send,
) -> Result<U, ResolveError>
where
    S: Scaffold<E> + ?Sized,
    E: Send,
{
    tracing::trace!(variant, path = %scope.path(), "resolving union variant");
    shell.resolve(scope).await.map(tag)
}

/// Pick a union variant by its runtime tag
///
/// Generated dispatch matches on a closed enum; this is for hosts that only
/// learn the variant name at run time.
///
/// # Errors
/// [`ResolveError::UnknownVariant`] if no candidate carries `variant`
pub fn select_variant<V>(
    union: &'static str,
    variant: &str,
    candidates: impl IntoIterator<Item = (&'static str, V)>,
) -> Result<V, ResolveError> {
    candidates
        .into_iter()
        .find_map(|(name, value)| (name == variant).then_some(value))
        .ok_or_else(|| ResolveError::UnknownVariant {
            union,
            variant: variant.to_string(),
        })
}
