//! Reference resolution through the run registry.
//!
//! References name registry entries by (type, key). Completed entries are
//! returned as they are, deferred entries are resolved at most once, and
//! anything never registered fails the whole resolution.

use pretty_assertions::assert_eq;
use scaffold_core::{Node, ResolveError, Resolver, Scaffolder};
use scaffold_test_utils::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn fan_in_workflow(jobs: usize, auth_key: &'static str) -> WorkflowSpec<()> {
    WorkflowSpec::<()>::new(move |b| {
        b.name("fan-in");
        for _ in 0..jobs {
            b.add_job(&JobSpec::<()>::new(move |b| {
                b.name("job");
                b.auth_ref(auth_key);
            }));
        }
    })
}

/// A reference with no registration fails; no default is produced.
#[tokio::test]
async fn unregistered_reference_fails_resolution() {
    let err = Resolver::new()
        .resolve_spec(&fan_in_workflow(1, "missing"), ())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unresolved reference Auth(\"missing\") at jobs[0].auth"
    );
    match err {
        ResolveError::UnresolvedReference { type_name, key, .. } => {
            assert_eq!(type_name, "Auth");
            assert_eq!(key, "missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Completed entries are shared by every reference to them.
#[tokio::test]
async fn completed_entry_serves_all_references() {
    let resolver = Resolver::new();
    resolver.register("ci", auth("bot", "token")).unwrap();

    let workflow = resolver.resolve_spec(&fan_in_workflow(3, "ci"), ()).await.unwrap();
    assert!(workflow
        .jobs
        .iter()
        .all(|job| job.auth == Some(auth("bot", "token"))));
    assert_eq!(resolver.stats().hits, 3);
}

/// Keys are typed: the same string may name different entity types.
#[tokio::test]
async fn keys_are_scoped_by_type() {
    let resolver = Resolver::new();
    resolver.register("main", auth("a", "b")).unwrap();
    resolver
        .register(
            "main",
            Step::Checkout(CheckoutStep {
                path: Some("main".into()),
            }),
        )
        .unwrap();

    let spec = JobSpec::<()>::new(|b| {
        b.name("typed");
        b.auth_ref("main");
        b.add_step_ref("main");
    });
    let job = resolver.resolve_spec(&spec, ()).await.unwrap();
    assert_eq!(job.auth, Some(auth("a", "b")));
    assert!(matches!(job.steps.as_slice(), [Step::Checkout(_)]));
}

/// Concurrent references to one deferred key construct it exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn deferred_entry_constructed_once_under_concurrency() {
    init_tracing();
    let resolver = Resolver::new();
    let counted = Counted::new(auth("shared", "secret")).with_delay(Duration::from_millis(20));
    let calls = counted.calls();
    resolver.register_node("shared", counted.into_node()).unwrap();

    let workflow = resolver
        .resolve_spec(&fan_in_workflow(16, "shared"), ())
        .await
        .unwrap();

    assert_eq!(workflow.jobs.len(), 16);
    assert!(workflow
        .jobs
        .iter()
        .all(|job| job.auth == Some(auth("shared", "secret"))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.stats().initializations, 1);
}

/// Deferred entries may themselves be specs and reference other entries.
#[tokio::test]
async fn deferred_spec_entries_chain() {
    let resolver = Resolver::new();
    resolver.register("ci", auth("bot", "token")).unwrap();
    resolver
        .register_node(
            "build",
            JobSpec::<()>::new(|b| {
                b.name("build");
                b.auth_ref("ci");
            })
            .create_node(()),
        )
        .unwrap();

    let spec = WorkflowSpec::<()>::new(|b| {
        b.name("referenced");
        b.add_job_ref("build");
        b.add_job_ref("build");
    });
    let workflow = resolver.resolve_spec(&spec, ()).await.unwrap();

    assert_eq!(workflow.jobs[0], workflow.jobs[1]);
    assert_eq!(workflow.jobs[0].auth, Some(auth("bot", "token")));
    assert_eq!(
        resolver.registry().get::<Job>("build").map(|job| job.name.clone()),
        Some("build".to_string())
    );
}

/// Deferred entries that wait on each other fail instead of hanging.
#[tokio::test]
async fn deferred_cycle_detected() {
    let resolver = Resolver::new();
    resolver.register_node::<Auth>("a", Node::reference("b")).unwrap();
    resolver.register_node::<Auth>("b", Node::reference("a")).unwrap();

    let err = resolver
        .resolve_spec(&fan_in_workflow(1, "a"), ())
        .await
        .unwrap_err();

    match err {
        ResolveError::ReferenceCycle { chain, path } => {
            assert_eq!(chain, vec!["Auth(\"b\")", "Auth(\"a\")", "Auth(\"b\")"]);
            assert_eq!(
                path.to_string(),
                "jobs[0].auth->Auth(\"a\")->Auth(\"b\")"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(resolver.stats().waiting, 0);
}

/// A resolved value can be published for later references.
#[tokio::test]
async fn resolve_and_register_feeds_later_resolutions() {
    let resolver = Resolver::new();
    let deploy = auth_spec::<()>("deploy", "pw").create_node(());
    resolver.resolve_and_register("deploy", &deploy).await.unwrap();

    let workflow = resolver
        .resolve_spec(&fan_in_workflow(2, "deploy"), ())
        .await
        .unwrap();
    assert_eq!(workflow.jobs[1].auth, Some(auth("deploy", "pw")));

    let err = resolver.resolve_and_register("deploy", &deploy).await.unwrap_err();
    assert!(matches!(err, ResolveError::Registry { .. }));
}

/// Map values may be references; they resolve like any other field.
#[tokio::test]
async fn map_value_reference_resolves() {
    let resolver = Resolver::new();
    resolver.register("region", String::from("eu")).unwrap();

    let spec = StepSpec::<()>::run(|b| {
        b.command("deploy");
        b.put_environment_ref("R", "region");
    });
    let step = resolver.resolve_spec(&spec, ()).await.unwrap();
    assert_eq!(
        step,
        Step::Run(RunStep {
            command: "deploy".into(),
            environment: env([("R", "eu")]),
        })
    );
}

/// A missing map value reference reports the value's position.
#[tokio::test]
async fn map_value_reference_missing() {
    let spec = StepSpec::<()>::run(|b| {
        b.command("deploy");
        b.put_environment_ref("R", "nope");
    });

    let err = Resolver::new().resolve_spec(&spec, ()).await.unwrap_err();
    assert!(err.is_unresolved_reference());
    assert_eq!(
        err.to_string(),
        "unresolved reference String(\"nope\") at environment[0].value"
    );
}
