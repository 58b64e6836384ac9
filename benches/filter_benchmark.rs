//! Listing-filter benchmarks.
//!
//! Measures the per-candidate cost of the content listing filter and the
//! project listing filter over large candidate sets.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench filter_benchmark
//! ```

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use vachan_access_core::{
    AccessEngine, App, CallerIdentity, InMemoryStore, PolicyTable, ProjectUser, RequestContext,
    ResourceEntry, ResourceInput, RoutePermissionMap,
};

const TAG_SETS: [&[&str]; 5] = [
    &["content"],
    &["content", "open-access"],
    &["content", "publishable", "downloadable"],
    &["content", "derivable"],
    &["content", "research-use"],
];

fn engine() -> AccessEngine<RoutePermissionMap, InMemoryStore> {
    AccessEngine::new(
        PolicyTable::builtin(),
        RoutePermissionMap::builtin(),
        InMemoryStore::new(),
    )
}

fn sources(size: usize) -> Vec<ResourceEntry> {
    (0..size)
        .map(|i| {
            let tags = TAG_SETS[i % TAG_SETS.len()].iter().copied();
            ResourceEntry::content(format!("src_{i}_bible"), tags)
        })
        .collect()
}

fn projects(size: usize) -> Vec<ResourceEntry> {
    (0..size)
        .map(|i| {
            let users = vec![
                ProjectUser::new(format!("U{}", i % 7), "projectOwner"),
                ProjectUser::new(format!("U{}", i % 11), "projectMember"),
            ];
            ResourceEntry::project(i as i64, users)
        })
        .collect()
}

fn bench_content_filter(c: &mut Criterion) {
    let engine = engine();
    let ctx = RequestContext::new("GET", "/v2/sources").with_app(App::VachanOnline.as_str());
    let callers = [
        ("anonymous", CallerIdentity::anonymous(None)),
        ("registered", CallerIdentity::authenticated("U1", ["VachanUser"])),
    ];

    let mut group = c.benchmark_group("content_filter");
    for size in [100, 1_000, 10_000] {
        let candidates = sources(size);
        for (label, caller) in &callers {
            group.bench_with_input(BenchmarkId::new(*label, size), &candidates, |b, candidates| {
                b.iter(|| {
                    let decision = engine
                        .decide_access(&ctx, caller, None, ResourceInput::Collection(candidates))
                        .unwrap();
                    black_box(decision.visible_count())
                });
            });
        }
    }
    group.finish();
}

fn bench_project_filter(c: &mut Criterion) {
    let engine = engine();
    let ctx = RequestContext::new("GET", "/v2/autographa/projects").with_app("Autographa");
    let member = CallerIdentity::authenticated("U3", ["AgUser"]);

    let mut group = c.benchmark_group("project_filter");
    for size in [100, 1_000, 10_000] {
        let candidates = projects(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| {
                let decision = engine
                    .decide_access(&ctx, &member, None, ResourceInput::Collection(candidates))
                    .unwrap();
                black_box(decision.visible_count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_content_filter, bench_project_filter);
criterion_main!(benches);
