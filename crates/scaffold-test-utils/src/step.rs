//! `Step` union of `CheckoutStep` and `RunStep`

use scaffold_core::{
    async_trait, resolve_entries, resolve_optional, resolve_required, resolve_variant,
    select_variant, Builder, IndexMap, Node, ResolveError, Scaffold, Scaffolder, Scope, Shell, Spec,
    Vector,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutStep {
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStep {
    pub command: String,
    pub environment: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Checkout(CheckoutStep),
    Run(RunStep),
}

#[derive(Debug, Clone, Default)]
pub struct CheckoutStepShell {
    pub path: Option<Node<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct RunStepShell {
    pub command: Option<Node<String>>,
    pub environment: Vector<(Node<String>, Node<String>)>,
}

/// Union shell: exactly one variant's shell
#[derive(Debug, Clone)]
pub enum StepShell {
    Checkout(CheckoutStepShell),
    Run(RunStepShell),
}

pub type CheckoutStepSpec<C> = Spec<CheckoutStepShell, C>;
pub type RunStepSpec<C> = Spec<RunStepShell, C>;

/// Union spec: one spec per variant
pub enum StepSpec<C> {
    Checkout(CheckoutStepSpec<C>),
    Run(RunStepSpec<C>),
}

#[async_trait]
impl Scaffold<CheckoutStep> for CheckoutStepShell {
    async fn resolve(&self, scope: &Scope) -> Result<CheckoutStep, ResolveError> {
        let path = resolve_optional(self.path.as_ref(), scope, "path").await?;
        Ok(CheckoutStep { path })
    }
}

impl Shell for CheckoutStepShell {
    type Entity = CheckoutStep;
    const ENTITY: &'static str = "CheckoutStep";

    fn into_node(self) -> Node<CheckoutStep> {
        Node::nested(self)
    }
}

#[async_trait]
impl Scaffold<RunStep> for RunStepShell {
    async fn resolve(&self, scope: &Scope) -> Result<RunStep, ResolveError> {
        let environment = resolve_entries(&self.environment, scope, "environment").await?;
        let command = resolve_required(self.command.as_ref(), scope, Self::ENTITY, "command").await?;
        Ok(RunStep { command, environment })
    }
}

impl Shell for RunStepShell {
    type Entity = RunStep;
    const ENTITY: &'static str = "RunStep";

    fn into_node(self) -> Node<RunStep> {
        Node::nested(self)
    }
}

#[async_trait]
impl Scaffold<Step> for StepShell {
    async fn resolve(&self, scope: &Scope) -> Result<Step, ResolveError> {
        match self {
            Self::Checkout(shell) => resolve_variant(shell, scope, "Checkout", Step::Checkout).await,
            Self::Run(shell) => resolve_variant(shell, scope, "Run", Step::Run).await,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Checkout(_) => CheckoutStepShell::ENTITY,
            Self::Run(_) => RunStepShell::ENTITY,
        }
    }
}

impl StepShell {
    /// Empty shell of the variant named by `tag`
    pub fn for_tag(tag: &str) -> Result<Self, ResolveError> {
        select_variant(
            Self::ENTITY,
            tag,
            [
                ("Checkout", Self::Checkout(CheckoutStepShell::default())),
                ("Run", Self::Run(RunStepShell::default())),
            ],
        )
    }
}

impl Shell for StepShell {
    type Entity = Step;
    const ENTITY: &'static str = "Step";

    fn into_node(self) -> Node<Step> {
        Node::nested(self)
    }
}

impl<C> StepSpec<C> {
    pub fn checkout(body: impl Fn(&mut Builder<CheckoutStepShell, C>) + Send + Sync + 'static) -> Self {
        Self::Checkout(Spec::new(body))
    }

    pub fn run(body: impl Fn(&mut Builder<RunStepShell, C>) + Send + Sync + 'static) -> Self {
        Self::Run(Spec::new(body))
    }
}

impl<C> Scaffolder<C> for StepSpec<C> {
    type Shell = StepShell;

    fn create_scaffold(&self, context: C) -> StepShell {
        match self {
            Self::Checkout(spec) => StepShell::Checkout(spec.create_scaffold(context)),
            Self::Run(spec) => StepShell::Run(spec.create_scaffold(context)),
        }
    }
}

impl<C> Clone for StepSpec<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Checkout(spec) => Self::Checkout(spec.clone()),
            Self::Run(spec) => Self::Run(spec.clone()),
        }
    }
}

impl<C> fmt::Debug for StepSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout(spec) => f.debug_tuple("Checkout").field(spec).finish(),
            Self::Run(spec) => f.debug_tuple("Run").field(spec).finish(),
        }
    }
}

pub trait CheckoutStepBuilder<C> {
    fn path(&mut self, value: impl Into<String>);
}

impl<C> CheckoutStepBuilder<C> for Builder<CheckoutStepShell, C> {
    fn path(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.path = Some(node);
            s
        });
    }
}

pub trait RunStepBuilder<C> {
    fn command(&mut self, value: impl Into<String>);
    fn put_environment(&mut self, key: impl Into<String>, value: impl Into<String>);
    fn put_environment_ref(&mut self, key: impl Into<String>, reference: &str);
    fn put_all_environment<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>;
}

impl<C> RunStepBuilder<C> for Builder<RunStepShell, C> {
    fn command(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.command = Some(node);
            s
        });
    }

    fn put_environment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let pair = (Node::literal(key.into()), Node::literal(value.into()));
        self.update(|mut s| {
            s.environment.push_back(pair);
            s
        });
    }

    fn put_environment_ref(&mut self, key: impl Into<String>, reference: &str) {
        let pair = (Node::literal(key.into()), Node::reference(reference));
        self.update(|mut s| {
            s.environment.push_back(pair);
            s
        });
    }

    fn put_all_environment<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: Vector<_> = entries
            .into_iter()
            .map(|(k, v)| (Node::literal(k.into()), Node::literal(v.into())))
            .collect();
        self.update(|mut s| {
            s.environment.append(pairs);
            s
        });
    }
}
