//! Testing utilities for scaffold workspace
//!
//! A small entity family written in the shape the code generator emits
//! (entity, shell, `Scaffold` impl, spec alias, builder setters), plus
//! instrumented scaffolds and tracing setup for tests.

#![allow(missing_docs)]

pub mod auth;
pub mod instrumented;
pub mod job;
pub mod step;
pub mod workflow;

pub use auth::{Auth, AuthBuilder, AuthShell, AuthSpec};
pub use instrumented::{Counted, Stalled};
pub use job::{Job, JobBuilder, JobShell, JobSpec};
pub use step::{
    CheckoutStep, CheckoutStepBuilder, CheckoutStepShell, CheckoutStepSpec, RunStep, RunStepBuilder,
    RunStepShell, RunStepSpec, Step, StepShell, StepSpec,
};
pub use workflow::{Workflow, WorkflowBuilder, WorkflowShell, WorkflowSpec};

use scaffold_core::IndexMap;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber; later calls are no-ops
///
/// Honors `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn auth(username: &str, password: &str) -> Auth {
    Auth {
        username: username.to_string(),
        password: password.to_string(),
    }
}

pub fn auth_spec<C: 'static>(username: &'static str, password: &'static str) -> AuthSpec<C> {
    AuthSpec::<C>::new(move |b| {
        b.username(username);
        b.password(password);
    })
}

pub fn checkout<C: 'static>(path: &'static str) -> StepSpec<C> {
    StepSpec::<C>::checkout(move |b| b.path(path))
}

pub fn run<C: 'static>(command: &'static str) -> StepSpec<C> {
    StepSpec::<C>::run(move |b| b.command(command))
}

pub fn env<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> IndexMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scaffold_core::{Resolver, Scaffolder, Shell};

    #[tokio::test]
    async fn job_fixture_resolves() {
        init_tracing();
        let spec = JobSpec::<()>::new(|b| {
            b.name("build");
            b.image("rust:1.75");
            b.auth(&auth_spec("ci", "secret"));
            b.add_step(&checkout("src"));
            b.add_step(&run("cargo build"));
            b.put_environment("CI", "true");
        });

        let job = Resolver::new().resolve_spec(&spec, ()).await.unwrap();
        assert_eq!(
            job,
            Job {
                name: "build".into(),
                image: Some("rust:1.75".into()),
                auth: Some(auth("ci", "secret")),
                steps: vec![
                    Step::Checkout(CheckoutStep {
                        path: Some("src".into())
                    }),
                    Step::Run(RunStep {
                        command: "cargo build".into(),
                        environment: IndexMap::new(),
                    }),
                ],
                environment: env([("CI", "true")]),
            }
        );
    }

    #[test]
    fn union_spec_builds_matching_shell() {
        let shell = run::<()>("make").create_scaffold(());
        assert!(matches!(shell, StepShell::Run(_)));
        let shell = checkout::<()>(".").create_scaffold(());
        assert!(matches!(shell, StepShell::Checkout(_)));
    }

    #[tokio::test]
    async fn union_shell_from_runtime_tag() {
        let shell = StepShell::for_tag("Checkout").unwrap();
        let step = Resolver::new().resolve(&shell.into_node()).await.unwrap();
        assert_eq!(step, Step::Checkout(CheckoutStep { path: None }));

        let err = StepShell::for_tag("Deploy").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "unknown variant \"Deploy\" of union Step");
    }

    #[test]
    fn init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
