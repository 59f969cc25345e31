//! `Workflow` entity: the root of the fixture family

use crate::job::{Job, JobShell};
use scaffold_core::{
    async_trait, resolve_all, resolve_required, Builder, Node, ResolveError, Scaffold, Scope, Shell, Spec,
    Vector,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub name: String,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowShell {
    pub name: Option<Node<String>>,
    pub jobs: Vector<Node<Job>>,
}

pub type WorkflowSpec<C> = Spec<WorkflowShell, C>;

#[async_trait]
impl Scaffold<Workflow> for WorkflowShell {
    async fn resolve(&self, scope: &Scope) -> Result<Workflow, ResolveError> {
        let jobs = resolve_all(&self.jobs, scope, "jobs").await?;
        let name = resolve_required(self.name.as_ref(), scope, Self::ENTITY, "name").await?;
        Ok(Workflow { name, jobs })
    }
}

impl Shell for WorkflowShell {
    type Entity = Workflow;
    const ENTITY: &'static str = "Workflow";

    fn into_node(self) -> Node<Workflow> {
        Node::nested(self)
    }
}

pub trait WorkflowBuilder<C> {
    fn name(&mut self, value: impl Into<String>);
    fn add_job(&mut self, spec: &Spec<JobShell, C>);
    fn add_job_ref(&mut self, key: &str);
}

impl<C: Clone> WorkflowBuilder<C> for Builder<WorkflowShell, C> {
    fn name(&mut self, value: impl Into<String>) {
        let node = Node::literal(value.into());
        self.update(|mut s| {
            s.name = Some(node);
            s
        });
    }

    fn add_job(&mut self, spec: &Spec<JobShell, C>) {
        let node = self.scaffold(spec);
        self.update(|mut s| {
            s.jobs.push_back(node);
            s
        });
    }

    fn add_job_ref(&mut self, key: &str) {
        let node = Node::reference(key);
        self.update(|mut s| {
            s.jobs.push_back(node);
            s
        });
    }
}
