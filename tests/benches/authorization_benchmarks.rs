//! # Authorization Benchmarks
//!
//! | Operation | Shape |
//! |-----------|-------|
//! | `run_checks` | N checks in one scope, split across groups |
//! | `run_checks` | ancestor chain of depth D, one check per grouping |
//! | `run_cooldowns` | rate-limited command, rotating users |
//! | alias composition | A ancestor aliases x B own aliases |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gate_authorization::{
    compose_full_aliases, AuthorizationApi, AuthorizationService, BucketScope, CheckOutcome,
    CommandBuilder, CommandTreeBuilder, FnCheck, GateConfig, GroupingBuilder, RateLimitCooldown,
};
use std::sync::Arc;
use std::time::Duration;

struct Ctx {
    user: u64,
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn bench_scope_fan_out(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("run-checks-fan-out");

    for size in [1usize, 8, 32, 128] {
        let mut builder = CommandBuilder::new().alias("cmd");
        for i in 0..size {
            let check = FnCheck::<Ctx>::new(format!("check-{i}"), move |inv| {
                (inv.context.user % 2 == 0 || i % 3 == 0).into()
            });
            builder = if i % 2 == 0 {
                builder.check(check.in_group(format!("group-{}", i % 4)))
            } else {
                builder.check(check)
            };
        }
        let mut tree = CommandTreeBuilder::with_separator(" ").expect("separator");
        let id = tree.add_command(None, builder).expect("command");
        let service = AuthorizationService::new(Arc::new(tree.build().expect("tree")), &GateConfig::default())
            .expect("service");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("checks", size), &size, |b, _| {
            b.iter(|| {
                let result = rt.block_on(service.run_checks(id, &Ctx { user: 2 }, None));
                black_box(result.map(|r| r.is_successful()).unwrap_or(false))
            })
        });
    }

    group.finish();
}

fn bench_ancestor_chain(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("run-checks-ancestors");

    for depth in [1usize, 4, 16] {
        let mut tree = CommandTreeBuilder::<Ctx>::with_separator(" ").expect("separator");
        let mut parent = None;
        for level in 0..depth {
            let grouping = GroupingBuilder::new()
                .alias(format!("g{level}"))
                .check(FnCheck::new("pass", |_| CheckOutcome::success()));
            parent = Some(tree.add_grouping(parent, grouping).expect("grouping"));
        }
        let id = tree
            .add_command(parent, CommandBuilder::new().alias("leaf"))
            .expect("command");
        let service = AuthorizationService::new(Arc::new(tree.build().expect("tree")), &GateConfig::default())
            .expect("service");

        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| black_box(rt.block_on(service.run_checks(id, &Ctx { user: 1 }, None)).is_ok()))
        });
    }

    group.finish();
}

fn bench_rate_limit_cooldown(c: &mut Criterion) {
    let rt = runtime();
    let cooldown = RateLimitCooldown::new(5, Duration::from_secs(10), BucketScope::User, |ctx: &Ctx| {
        Some(ctx.user.to_string())
    })
    .expect("cooldown");

    let mut tree = CommandTreeBuilder::with_separator(" ").expect("separator");
    let id = tree
        .add_command(None, CommandBuilder::new().alias("daily").cooldown(cooldown))
        .expect("command");
    let service = AuthorizationService::new(Arc::new(tree.build().expect("tree")), &GateConfig::default())
        .expect("service");

    let mut user = 0u64;
    c.bench_function("run-cooldowns-rotating-users", |b| {
        b.iter(|| {
            user = (user + 1) % 1024;
            black_box(rt.block_on(service.run_cooldowns(id, &Ctx { user }, None)).is_ok())
        })
    });
}

fn bench_alias_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose-full-aliases");

    for width in [1usize, 4, 16] {
        let parents: Vec<String> = (0..width).map(|i| format!("parent{i}")).collect();
        let own: Vec<String> = (0..width).map(|i| format!("own{i}")).collect();

        group.throughput(Throughput::Elements((width * width) as u64));
        group.bench_with_input(BenchmarkId::new("width", width), &width, |b, _| {
            b.iter(|| black_box(compose_full_aliases(&parents, &own, " ")))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scope_fan_out,
    bench_ancestor_chain,
    bench_rate_limit_cooldown,
    bench_alias_composition
);
criterion_main!(benches);
