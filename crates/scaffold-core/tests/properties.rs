//! Property tests for ordering and keyed-field folding.

use proptest::prelude::*;
use scaffold_core::{IndexMap, ResolveConfig, Resolver};
use scaffold_test_utils::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of adds resolves to the same sequence, for any fan-out.
    #[test]
    fn adds_resolve_in_order(
        commands in prop::collection::vec("[a-z]{1,8}", 0..40),
        limit in 1usize..8,
    ) {
        let expected = commands.clone();
        let spec = StepSpec::<()>::run(|b| b.command("noop"));
        let spec = JobSpec::<()>::new(move |b| {
            b.name("prop");
            for command in &commands {
                let command = command.clone();
                b.add_step_value(Step::Run(RunStep {
                    command,
                    environment: IndexMap::new(),
                }));
            }
            b.add_step(&spec);
        });

        let resolver = Resolver::new().with_config(ResolveConfig::new().with_max_concurrency(limit));
        let job = runtime().block_on(resolver.resolve_spec(&spec, ())).unwrap();

        let mut resolved: Vec<String> = job
            .steps
            .into_iter()
            .filter_map(|step| match step {
                Step::Run(run) => Some(run.command),
                Step::Checkout(_) => None,
            })
            .collect();
        let last = resolved.pop();
        prop_assert_eq!(last.as_deref(), Some("noop"));
        prop_assert_eq!(resolved, expected);
    }

    /// Keyed fields resolve like successive map inserts.
    #[test]
    fn puts_fold_like_map_inserts(
        pairs in prop::collection::vec(("[A-D]", "[a-z]{1,4}"), 0..24),
    ) {
        let mut model: IndexMap<String, String> = IndexMap::new();
        for (key, value) in &pairs {
            model.insert(key.clone(), value.clone());
        }

        let spec = StepSpec::<()>::run(move |b| {
            b.command("env");
            b.put_all_environment(pairs.clone());
        });
        let Step::Run(step) = runtime().block_on(Resolver::new().resolve_spec(&spec, ())).unwrap() else {
            panic!("expected run step");
        };

        let resolved: Vec<_> = step.environment.into_iter().collect();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(resolved, expected);
    }
}
