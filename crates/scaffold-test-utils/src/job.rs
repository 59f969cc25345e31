//! `Job` entity: scalars, an optional nested entity, a union list and a map

use crate::auth::{Auth, AuthShell};
use crate::step::{Step, StepSpec};
use scaffold_core::{
    async_trait, resolve_all, resolve_entries, resolve_optional, resolve_required, Builder,
    IndexMap, Node, ResolveError, Scaffold, Scope, Shell, Spec, Vector,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub image: Option<String>,
    pub auth: Option<Auth>,
    pub steps: Vec<Step>,
    pub environment: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobShell {
    pub name: Option<Node<String>>,
    pub image: Option<Node<String>>,
    pub auth: Option<Node<Auth>>,
    pub steps: Vector<Node<Step>>,
    pub environment: Vector<(Node<String>, Node<String>)>,
}

pub type JobSpec<C> = Spec<JobShell, C>;

#[async_trait]
impl Scaffold<Job> for JobShell {
    async fn resolve(&self, scope: &Scope) -> Result<Job, ResolveError> {
        let (auth, steps, environment) = futures::try_join!(
            resolve_optional(self.auth.as_ref(), scope, "auth"),
            resolve_all(&self.steps, scope, "steps"),
            resolve_entries(&self.environment, scope, "environment"),
        )?;
        let name = resolve_required(self.name.as_ref(), scope, Self::ENTITY, "name").await?;
        let image = resolve_optional(self.image.as_ref(), scope, "image").await?;
        Ok(Job {
            name,
            image,
            auth,
            steps,
            environment,
        })
    }
}

impl Shell for JobShell {
    type Entity = Job;
    const ENTITY: &'static str = "Job";

    fn into_node(self) -> Node<Job> {
        Node::nested(self)
    }
}

pub trait JobBuilder<C> {
    fn name(&mut self, value: impl Into<String>);
    fn image(&mut self, value: impl Into<String>);
    fn auth(&mut self, spec: &Spec<AuthShell, C>);
    fn auth_value(&mut self, value: Auth);
    fn auth_ref(&mut self, key: &str);
    fn add_step(&mut self, spec: &StepSpec<C>);
    fn add_step_value(&mut self, value: Step);
    fn add_step_ref(&mut self, key: &str);
    fn add_all_steps<'a, I>(&mut self, specs: I)
    where
        I: IntoIterator<Item = &'a StepSpec<C>>,
        C: 'a;
    fn put_environment(&mut self, key: impl Into<String>, value: impl Into<String>);
}

impl<C: Clone> JobBuilder<C> for Builder<JobShell, C> {
    fn name(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.name = Some(node);
            s
        });
    }

    fn image(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.image = Some(node);
            s
        });
    }

    fn auth(&mut self, spec: &Spec<AuthShell, C>) {
        let node = self.scaffold(spec);
        self.update(|mut s| {
            s.auth = Some(node);
            s
        });
    }

    fn auth_value(&mut self, value: Auth) {
        self.update(|mut s| {
            s.auth = Some(Node::literal(value));
            s
        });
    }

    fn auth_ref(&mut self, key: &str) {
        let node = Node::reference(key);
        self.update(|mut s| {
            s.auth = Some(node);
            s
        });
    }

    fn add_step(&mut self, spec: &StepSpec<C>) {
        let node = self.scaffold(spec);
        self.update(|mut s| {
            s.steps.push_back(node);
            s
        });
    }

    fn add_step_value(&mut self, value: Step) {
        self.update(|mut s| {
            s.steps.push_back(Node::literal(value));
            s
        });
    }

    fn add_step_ref(&mut self, key: &str) {
        let node = Node::reference(key);
        self.update(|mut s| {
            s.steps.push_back(node);
            s
        });
    }

    fn add_all_steps<'a, I>(&mut self, specs: I)
    where
        I: IntoIterator<Item = &'a StepSpec<C>>,
        C: 'a,
    {
        let nodes: Vector<Node<Step>> = specs.into_iter().map(|spec| self.scaffold(spec)).collect();
        self.update(|mut s| {
            s.steps.append(nodes);
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
}
