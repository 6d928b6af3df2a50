use cinescout::{MovieStore, QueryKind, SearchOptions, SearchService};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn create_catalog(path: &Path, rows: usize) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "title,release_year,director")?;
    for i in 0..rows {
        writeln!(
            file,
            "Feature Film {},{},Director {}",
            i,
            1920 + (i % 100),
            i % 250
        )?;
    }
    file.flush()
}

fn bench_cold_load(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let mut group = c.benchmark_group("Cold Load");
    for rows in [100, 1_000, 10_000] {
        let path = dir.path().join(format!("movies_{}.csv", rows));
        create_catalog(&path, rows).unwrap();

        group.bench_function(format!("rows_{}", rows), |b| {
            b.iter(|| {
                let store = MovieStore::new(&path);
                black_box(store.current_records().unwrap())
            });
        });
    }
    group.finish();
}

fn bench_cached_vs_uncached(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("movies.csv");
    create_catalog(&path, 10_000).unwrap();

    let cached = SearchService::new(Arc::new(MovieStore::new(&path)));
    let uncached = SearchService::with_options(
        Arc::new(MovieStore::new(&path)),
        SearchOptions {
            cache_enabled: false,
            ..SearchOptions::default()
        },
    );

    let mut group = c.benchmark_group("Title Search");
    group.bench_function("cached", |b| {
        b.iter(|| black_box(cached.search(QueryKind::Title, "film 42").unwrap()));
    });
    group.bench_function("uncached", |b| {
        b.iter(|| black_box(uncached.search(QueryKind::Title, "film 42").unwrap()));
    });
    group.finish();
}

fn bench_index_lookup(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("movies.csv");
    create_catalog(&path, 10_000).unwrap();

    let store = MovieStore::new(&path);
    let service = SearchService::with_options(
        Arc::new(MovieStore::new(&path)),
        SearchOptions {
            cache_enabled: false,
            ..SearchOptions::default()
        },
    );

    let mut group = c.benchmark_group("Year Lookup");
    group.bench_function("index", |b| {
        b.iter(|| black_box(store.lookup_by_year(1980).unwrap()));
    });
    group.bench_function("strategy_scan", |b| {
        b.iter(|| black_box(service.search(QueryKind::Year, 1980).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_cold_load,
    bench_cached_vs_uncached,
    bench_index_lookup
);
criterion_main!(benches);
