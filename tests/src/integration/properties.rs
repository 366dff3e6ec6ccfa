//! # Group Reduction Properties
//!
//! Random pass/fail assignments over random group layouts, checked through
//! the facade against the reduction rule.

use std::collections::BTreeMap;

use gate_authorization::{AuthorizationApi, CommandBuilder, CommandTreeBuilder};
use proptest::prelude::*;

use super::fixtures::{service, Invocation, ScriptedCheck};

/// (group index or ungrouped, passes)
type Layout = Vec<(Option<u8>, bool)>;

fn layout() -> impl Strategy<Value = Layout> {
    prop::collection::vec((prop::option::of(0u8..3), any::<bool>()), 0..10)
}

fn expected_failures(layout: &Layout) -> Vec<String> {
    // Partition order is the first appearance of each key.
    let mut order: Vec<Option<u8>> = Vec::new();
    let mut members: BTreeMap<Option<u8>, Vec<(usize, bool)>> = BTreeMap::new();
    for (index, (group, pass)) in layout.iter().enumerate() {
        if !order.contains(group) {
            order.push(*group);
        }
        members.entry(*group).or_default().push((index, *pass));
    }

    let mut failed = Vec::new();
    for key in order {
        let partition = &members[&key];
        let partition_failed = match key {
            None => partition.iter().any(|(_, pass)| !pass),
            Some(_) => partition.iter().all(|(_, pass)| !pass),
        };
        if partition_failed {
            failed.extend(
                partition
                    .iter()
                    .filter(|(_, pass)| !pass)
                    .map(|(index, _)| format!("check-{index}")),
            );
        }
    }
    failed
}

fn run(layout: &Layout) -> Vec<String> {
    let mut builder = CommandBuilder::new().alias("cmd");
    for (index, (group, pass)) in layout.iter().enumerate() {
        let name = format!("check-{index}");
        let check = if *pass {
            ScriptedCheck::pass(&name)
        } else {
            ScriptedCheck::fail(&name)
        };
        builder = match group {
            Some(g) => builder.check(check.in_group(&format!("group-{g}"))),
            None => builder.check(check),
        };
    }

    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree.add_command(None, builder).unwrap();
    let service = service(tree.build().unwrap());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let result = runtime
        .block_on(service.run_checks(id, &Invocation::user(1), None))
        .unwrap();

    result
        .checks_failed()
        .map(|failed| {
            failed
                .failures()
                .iter()
                .map(|f| f.check().to_string())
                .collect()
        })
        .unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_facade_matches_reduction_rule(layout in layout()) {
        prop_assert_eq!(run(&layout), expected_failures(&layout));
    }

    #[test]
    fn prop_all_passing_always_succeeds(groups in prop::collection::vec(prop::option::of(0u8..3), 0..10)) {
        let layout: Layout = groups.into_iter().map(|g| (g, true)).collect();
        prop_assert!(run(&layout).is_empty());
    }
}
