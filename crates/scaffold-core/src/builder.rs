//! Builders
//!
//! A [`Builder`] is the mutable accumulation surface a spec body runs
//! against. It holds a caller-chosen context value and the shell built so
//! far. Generated setters live in per-entity extension traits implemented for
//! `Builder<XShell, C>`; they call [`Builder::update`] and return nothing.
//!
//! The build phase is synchronous and single-threaded: a builder is never
//! shared between writers.
//!
//! # Context-scoped composition
//!
//! ```rust,ignore
//! spec.apply(&mut builder);                            // include, same context
//! builder.include_with(Env::Staging, |b| b.name("x")); // split, run, merge
//! builder.include_for_each(envs, |b| b.add_tag(b.context().name()));
//! ```

use crate::node::Node;
use crate::shell::Shell;
use crate::spec::{Scaffolder, Spec};

/// Per-entity accumulation surface, parameterized by a context `C`
#[derive(Debug, Clone)]
pub struct Builder<S, C> {
    context: C,
    shell: S,
}

impl<S: Shell + Default, C> Builder<S, C> {
    /// Create builder with an empty shell
    #[inline]
    #[must_use]
    pub fn new(context: C) -> Self {
        Self::from_shell(context, S::default())
    }
}

impl<S: Shell, C> Builder<S, C> {
    /// Create builder continuing from an existing shell
    #[inline]
    #[must_use]
    pub fn from_shell(context: C, shell: S) -> Self {
        Self { context, shell }
    }

    /// Get the context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Get the shell built so far
    #[inline]
    #[must_use]
    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Replace the shell with `f(copy of current shell)`
    ///
    /// Shells handed out earlier are unaffected.
    #[inline]
    pub fn update(&mut self, f: impl FnOnce(S) -> S) {
        self.shell = f(self.shell.clone());
    }

    /// Finish building and return the shell
    #[inline]
    #[must_use]
    pub fn finish(self) -> S {
        self.shell
    }

    /// Split into context and shell
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (C, S) {
        (self.context, self.shell)
    }

    /// Run build instructions against this builder
    pub fn include(&mut self, body: impl FnOnce(&mut Self)) {
        body(self);
    }

    /// Run a spec's instructions against this builder
    pub fn include_spec(&mut self, spec: &Spec<S, C>) {
        spec.apply(self);
    }

    /// Child builder sharing the shell so far, bound to another context
    #[must_use]
    pub fn split<C2>(&self, context: C2) -> Builder<S, C2> {
        Builder::from_shell(context, self.shell.clone())
    }

    /// Take over a child's shell, dropping its context
    pub fn merge<C2>(&mut self, child: Builder<S, C2>) {
        self.shell = child.shell;
    }

    /// Run instructions under another context, then keep their result
    pub fn include_with<C2>(&mut self, context: C2, body: impl FnOnce(&mut Builder<S, C2>)) {
        let mut child = self.split(context);
        body(&mut child);
        self.merge(child);
    }

    /// Run a spec under another context, then keep its result
    pub fn include_spec_with<C2>(&mut self, context: C2, spec: &Spec<S, C2>) {
        self.include_with(context, |child| spec.apply(child));
    }

    /// Run instructions once per context, in iteration order
    ///
    /// Each run starts from the shell the previous one left behind.
    pub fn include_for_each<C2, I>(&mut self, contexts: I, mut body: impl FnMut(&mut Builder<S, C2>))
    where
        I: IntoIterator<Item = C2>,
    {
        for context in contexts {
            self.include_with(context, &mut body);
        }
    }

    /// Run a spec once per context, in iteration order
    pub fn include_spec_for_each<C2, I>(&mut self, contexts: I, spec: &Spec<S, C2>)
    where
        I: IntoIterator<Item = C2>,
    {
        self.include_for_each(contexts, |child| spec.apply(child));
    }
}

impl<S: Shell, C: Clone> Builder<S, C> {
    /// Build a nested spec now, under this builder's context
    ///
    /// Used by set-by-subspec setters; the result is a `Nested` node.
    #[must_use]
    pub fn scaffold<P>(&self, spec: &P) -> Node<<P::Shell as Shell>::Entity>
    where
        P: Scaffolder<C> + ?Sized,
    {
        spec.create_node(self.context.clone())
    }
}
