//! # Grouping Hierarchy
//!
//! Alias composition across nested groupings and ancestor check gating.

use std::sync::atomic::Ordering;

use gate_authorization::{
    AuthorizationApi, CommandBuilder, CommandTreeBuilder, ConfigurationError, FailedScope,
    GateConfig, GroupingBuilder,
};

use super::fixtures::{service, Invocation, ScriptedCheck};

#[test]
fn test_two_groupings_compose_full_alias() {
    let mut tree = CommandTreeBuilder::<Invocation>::with_separator(" ").unwrap();
    let g1 = tree
        .add_grouping(None, GroupingBuilder::new().alias("g1"))
        .unwrap();
    let g2 = tree
        .add_grouping(Some(g1), GroupingBuilder::new().alias("g2"))
        .unwrap();
    let run = tree
        .add_command(Some(g2), CommandBuilder::new().alias("run"))
        .unwrap();
    let tree = tree.build().unwrap();

    let command = tree.command(run).unwrap();
    assert_eq!(command.full_aliases(), ["g1 g2 run".to_string()]);
    assert_eq!(command.name(), "g1 g2 run");
    assert_eq!(tree.find_command("g1 g2 run").unwrap().id(), run);
}

#[test]
fn test_alias_cartesian_product_through_tree() {
    let config = GateConfig::builder().separator(".").build().unwrap();
    let mut tree = CommandTreeBuilder::<Invocation>::new(&config).unwrap();
    let config_group = tree
        .add_grouping(
            None,
            GroupingBuilder::new().alias("config").alias("cfg"),
        )
        .unwrap();
    let get = tree
        .add_command(
            Some(config_group),
            CommandBuilder::new().alias("get").alias("g"),
        )
        .unwrap();
    let tree = tree.build().unwrap();

    let command = tree.command(get).unwrap();
    assert_eq!(
        command.full_aliases(),
        ["config.get", "config.g", "cfg.get", "cfg.g"].map(String::from)
    );
    assert_eq!(tree.find_command("cfg.g").unwrap().id(), get);
}

#[test]
fn test_unnamed_command_at_root_is_rejected() {
    let mut tree = CommandTreeBuilder::<Invocation>::with_separator(" ").unwrap();
    let result = tree.add_command(None, CommandBuilder::new());
    assert!(matches!(result, Err(ConfigurationError::MissingName)));
}

#[tokio::test]
async fn test_ancestor_failure_skips_own_checks() {
    let own = ScriptedCheck::pass("own");
    let own_calls = own.calls();
    let inner = ScriptedCheck::pass("inner-gate");
    let inner_calls = inner.calls();

    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let admin = tree
        .add_grouping(
            None,
            GroupingBuilder::new()
                .alias("admin")
                .check(ScriptedCheck::fail("owner-only")),
        )
        .unwrap();
    let users = tree
        .add_grouping(Some(admin), GroupingBuilder::new().alias("users").check(inner))
        .unwrap();
    let delete = tree
        .add_command(Some(users), CommandBuilder::new().alias("delete").check(own))
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(delete, &Invocation::user(1), None)
        .await
        .unwrap();

    let failed = result.checks_failed().unwrap();
    assert!(matches!(
        failed.scope(),
        FailedScope::Grouping { id, name } if *id == admin && name == "admin"
    ));
    assert!(failed.reason().contains("grouping 'admin'"));
    assert_eq!(inner_calls.load(Ordering::SeqCst), 0);
    assert_eq!(own_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ancestor_groups_use_their_own_reduction() {
    let own = ScriptedCheck::fail("own");
    let own_calls = own.calls();

    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let staff = tree
        .add_grouping(
            None,
            GroupingBuilder::new()
                .alias("staff")
                .check(ScriptedCheck::fail("owner").in_group("rank"))
                .check(ScriptedCheck::pass("moderator").in_group("rank")),
        )
        .unwrap();
    let id = tree
        .add_command(Some(staff), CommandBuilder::new().alias("note").check(own))
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    // The grouping passes via "moderator"; the command's own check then fails.
    let failed = result.checks_failed().unwrap();
    assert_eq!(failed.scope(), &FailedScope::Command);
    assert_eq!(failed.failures()[0].check(), "own");
    assert_eq!(own_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_passing_ancestors_then_own_checks() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let outer = tree
        .add_grouping(
            None,
            GroupingBuilder::new()
                .alias("music")
                .check(ScriptedCheck::pass("voice-connected")),
        )
        .unwrap();
    let id = tree
        .add_command(
            Some(outer),
            CommandBuilder::new()
                .alias("skip")
                .check(ScriptedCheck::pass("dj")),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    assert!(service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap()
        .is_successful());
}
