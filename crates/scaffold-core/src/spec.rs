//! Specs and scaffolders
//!
//! A [`Spec`] is a reusable, context-parameterized bundle of build
//! instructions. Running it against a fresh builder yields a shell; a
//! [`Scaffolder`] is anything that can produce a shell (and from it a root
//! node) for a given context. Union specs implement [`Scaffolder`] by
//! dispatching on the variant they hold.

use crate::builder::Builder;
use crate::node::Node;
use crate::shell::Shell;
use std::fmt;
use std::sync::Arc;

type Body<S, C> = dyn Fn(&mut Builder<S, C>) + Send + Sync;

/// Reusable build instructions for shell `S` under context `C`
///
/// Cloning is cheap; clones share the instructions.
pub struct Spec<S, C> {
    body: Arc<Body<S, C>>,
}

impl<S, C> Spec<S, C> {
    /// Create spec from build instructions
    #[inline]
    #[must_use]
    pub fn new(body: impl Fn(&mut Builder<S, C>) + Send + Sync + 'static) -> Self {
        Self { body: Arc::new(body) }
    }

    /// Run the instructions against a builder
    #[inline]
    pub fn apply(&self, builder: &mut Builder<S, C>) {
        (self.body)(builder);
    }
}

impl<S, C> Clone for Spec<S, C> {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
        }
    }
}

impl<S, C> fmt::Debug for Spec<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("shell", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}

/// Produces a shell for a given context
pub trait Scaffolder<C> {
    /// Shell produced
    type Shell: Shell;

    /// Build a shell under `context`
    fn create_scaffold(&self, context: C) -> Self::Shell;

    /// Build a shell under `context` and wrap it as a root node
    fn create_node(&self, context: C) -> Node<<Self::Shell as Shell>::Entity> {
        self.create_scaffold(context).into_node()
    }
}

impl<S, C> Scaffolder<C> for Spec<S, C>
where
    S: Shell + Default,
{
    type Shell = S;

    fn create_scaffold(&self, context: C) -> S {
        let mut builder = Builder::new(context);
        self.apply(&mut builder);
        builder.finish()
    }
}
