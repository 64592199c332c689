//! Benchmarks for provider selection over a populated directory.
//!
//! Covers:
//! - Immediate-match selection across growing directory sizes
//! - Busy-candidate ranking through the availability estimator

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use job_dispatch::core::{
    select_provider, Job, JobStatus, Priority, Provider, RequesterId, Selection,
};
use job_dispatch::infra::store::InMemoryStore;
use job_dispatch::util::clock::now_ms;

use rand::Rng;
use tokio::runtime::Runtime;
use uuid::Uuid;

fn seeded_store(providers: usize, busy_fraction: f64) -> InMemoryStore {
    let store = InMemoryStore::new();
    let mut rng = rand::rng();

    for n in 0..providers {
        let mut p = Provider::new(
            format!("provider-{n}"),
            "555-0000",
            "plumber",
            vec!["plumbing".into()],
        );
        p.approved = true;
        p.rating = rng.random_range(1.0..5.0);
        p.total_jobs_completed = rng.random_range(0..500);
        p.is_available = rng.random_bool(1.0 - busy_fraction);

        if !p.is_available {
            let mut job = Job::new(
                "plumbing",
                "bench site",
                "bench work",
                Priority::Medium,
                RequesterId(Uuid::new_v4()),
            );
            job.status = JobStatus::Accepted;
            job.accepted_by = Some(p.id);
            job.estimated_completion_ms = Some(now_ms() + rng.random_range(1..120) * 60_000);
            p.current_job = Some(job.id);
            store.seed_job(job);
        }
        store.seed_provider(p);
    }
    store
}

fn bench_immediate_match(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("select_immediate");

    for size in [10usize, 100, 1_000] {
        let store = seeded_store(size, 0.0);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| {
                let sel = rt
                    .block_on(select_provider(store, store, "plumbing", now_ms()))
                    .unwrap();
                assert!(matches!(sel, Selection::Available(_)));
                black_box(sel);
            });
        });
    }
    group.finish();
}

fn bench_busy_ranking(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("select_busy_ranked");

    for size in [10usize, 100] {
        let store = seeded_store(size, 1.0);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| {
                let sel = rt
                    .block_on(select_provider(store, store, "plumbing", now_ms()))
                    .unwrap();
                assert!(matches!(sel, Selection::Busy(_)));
                black_box(sel);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_immediate_match, bench_busy_ranking);
criterion_main!(benches);
