//! # End-to-end Authorization Flows
//!
//! Drives `run_checks` and `run_cooldowns` through the public facade:
//!
//! 1. Ungrouped checks are independent mandatory gates
//! 2. A named group is satisfied by any passing member
//! 3. A fully failed named group reports every member
//! 4. Only hot cooldown buckets are reported, in declaration order
//! 5. Policy faults surface instead of passing silently

use std::time::Duration;

use gate_authorization::{
    AuthResult, AuthorizationApi, BucketScope, BucketType, CommandBuilder, CommandTreeBuilder, GateError,
    PolicyFault,
};

use super::fixtures::{service, FaultingCheck, Invocation, ScriptedCheck, ScriptedCooldown};

fn failed_names(result: &AuthResult) -> Vec<String> {
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

// =============================================================================
// CHECKS
// =============================================================================

#[tokio::test]
async fn test_ungrouped_failure_fails_command() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("purge")
                .check(ScriptedCheck::pass("A"))
                .check(ScriptedCheck::fail("B")),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    assert!(!result.is_successful());
    assert_eq!(failed_names(&result), vec!["B"]);
    assert!(result.reason().unwrap().contains("B rejected the invocation"));
    assert!(result.reason().unwrap().contains("'purge'"));
}

#[tokio::test]
async fn test_named_group_satisfied_by_one_member() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("kick")
                .check(ScriptedCheck::fail("A").in_group("mod"))
                .check(ScriptedCheck::pass("B").in_group("mod"))
                .check(ScriptedCheck::pass("C")),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    assert!(result.is_successful());
    assert!(result.reason().is_none());
}

#[tokio::test]
async fn test_named_group_all_failed_reports_every_member() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("ban")
                .check(ScriptedCheck::fail("A").in_group("mod"))
                .check(ScriptedCheck::fail("B").in_group("mod")),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    assert_eq!(failed_names(&result), vec!["A", "B"]);
    let failed = result.checks_failed().unwrap();
    assert!(failed.failures().iter().all(|f| f.group() == Some("mod")));
    assert!(failed.reason().starts_with("2 checks failed"));
}

#[tokio::test]
async fn test_failures_follow_partition_discovery_order() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("mute")
                .check(ScriptedCheck::fail("owner").in_group("staff"))
                .check(ScriptedCheck::fail("guild-only"))
                .check(ScriptedCheck::fail("admin").in_group("staff"))
                .check(ScriptedCheck::pass("nsfw").in_group("channel")),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    assert_eq!(failed_names(&result), vec!["owner", "admin", "guild-only"]);
}

#[tokio::test]
async fn test_no_checks_anywhere_succeeds() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(None, CommandBuilder::new().alias("ping"))
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();
    assert!(matches!(result, AuthResult::Success));
}

// =============================================================================
// COOLDOWNS
// =============================================================================

#[tokio::test]
async fn test_only_hot_bucket_reported() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("daily")
                .cooldown(ScriptedCooldown::hot(BucketScope::User, Duration::from_secs(5)))
                .cooldown(ScriptedCooldown::cold(BucketScope::Channel)),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_cooldowns(id, &Invocation::user(1), None)
        .await
        .unwrap();

    let cooldown = result.on_cooldown().expect("command should be on cooldown");
    assert_eq!(cooldown.cooldowns().len(), 1);
    let hot = &cooldown.cooldowns()[0];
    assert_eq!(hot.bucket_type(), Some(&BucketType::from(BucketScope::User)));
    assert_eq!(hot.retry_after(), Duration::from_secs(5));
    assert_eq!(
        result.reason().unwrap(),
        "Command 'daily' is on a 'User' cooldown. Retry after 5s."
    );
}

#[tokio::test]
async fn test_multiple_hot_buckets_use_plural_reason() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("rob")
                .cooldown(ScriptedCooldown::hot(BucketScope::Guild, Duration::from_secs(60)))
                .cooldown(ScriptedCooldown::cold(BucketScope::Channel))
                .cooldown(ScriptedCooldown::hot(BucketScope::User, Duration::from_millis(1500))),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_cooldowns(id, &Invocation::user(1), None)
        .await
        .unwrap();

    assert_eq!(
        result.reason().unwrap(),
        "Command 'rob' is on multiple cooldowns: 'Guild' - retry after 60s, 'User' - retry after 1.5s"
    );
}

#[tokio::test]
async fn test_checks_and_cooldowns_are_independent_gates() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("warn")
                .check(ScriptedCheck::fail("admin"))
                .cooldown(ScriptedCooldown::cold(BucketScope::User)),
        )
        .unwrap();
    let service = service(tree.build().unwrap());
    let ctx = Invocation::user(1);

    assert!(!service.run_checks(id, &ctx, None).await.unwrap().is_successful());
    assert!(service.run_cooldowns(id, &ctx, None).await.unwrap().is_successful());
}

// =============================================================================
// FAULTS
// =============================================================================

#[tokio::test]
async fn test_faulting_check_is_a_failed_check_with_fault() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new()
                .alias("sync")
                .check(FaultingCheck {
                    name: "permissions",
                    panics: false,
                })
                .check(ScriptedCheck::pass("guild-only")),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    let failed = result.checks_failed().unwrap();
    assert!(failed.has_faults());
    assert_eq!(failed.failures().len(), 1);
    assert!(matches!(failed.failures()[0].fault(), Some(PolicyFault::Error(_))));
}

#[tokio::test]
async fn test_panicking_check_is_contained() {
    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    let id = tree
        .add_command(
            None,
            CommandBuilder::new().alias("eval").check(FaultingCheck {
                name: "sandbox",
                panics: true,
            }),
        )
        .unwrap();
    let service = service(tree.build().unwrap());

    let result = service
        .run_checks(id, &Invocation::user(1), None)
        .await
        .unwrap();

    let failure = &result.checks_failed().unwrap().failures()[0];
    match failure.fault() {
        Some(PolicyFault::Panicked(message)) => assert!(message.contains("sandbox exploded")),
        other => panic!("expected panic fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_command_is_an_error() {
    let mut other = CommandTreeBuilder::<Invocation>::with_separator(" ").unwrap();
    other.add_command(None, CommandBuilder::new().alias("a")).unwrap();
    let foreign = other
        .add_command(None, CommandBuilder::new().alias("b"))
        .unwrap();

    let mut tree = CommandTreeBuilder::with_separator(" ").unwrap();
    tree.add_command(None, CommandBuilder::new().alias("only"))
        .unwrap();
    let service = service(tree.build().unwrap());

    let err = service
        .run_cooldowns(foreign, &Invocation::user(1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::UnknownCommand(id) if id == foreign));
}
