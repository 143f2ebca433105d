//! Training, prediction and exploration throughput on synthetic calories data.

use std::time::Duration;

use calboost::Parallelism;
use calboost::data::BinnedDataset;
use calboost::model::gbdt::{GBDTConfig, TreeParams};
use calboost::pipeline::explore;
use calboost::testing::synthetic_table;
use calboost::training::{GBDTParams, GBDTTrainer, GainParams, GrowthStrategy, Rmse, SquaredLoss};
use calboost::{Dataset, GBDTModel};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Baseline configuration; `--bench` flags still override it.
fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(10))
        .sample_size(10)
}

fn calories_dataset(rows: usize) -> Dataset {
    synthetic_table(rows, 42)
        .to_dataset()
        .expect("synthetic table converts")
}

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/quantize");

    for rows in [1_000usize, 15_000, 100_000] {
        let dataset = calories_dataset(rows);
        group.throughput(Throughput::Elements((rows * dataset.n_features()) as u64));
        group.bench_with_input(BenchmarkId::new("max_bins=256", rows), &dataset, |b, ds| {
            b.iter(|| {
                black_box(BinnedDataset::from_features(
                    black_box(ds).features(),
                    256,
                    Parallelism::Parallel,
                ))
            })
        });
    }

    group.finish();
}

fn bench_trainer(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/trainer");

    for (name, growth) in [
        ("depth_wise=6", GrowthStrategy::DepthWise { max_depth: 6 }),
        ("leaf_wise=31", GrowthStrategy::LeafWise { max_leaves: 31 }),
    ] {
        let dataset = calories_dataset(15_000);
        let binned = BinnedDataset::from_features(dataset.features(), 256, Parallelism::Parallel);
        let params = GBDTParams {
            n_trees: 50,
            learning_rate: 0.3,
            growth_strategy: growth,
            gain: GainParams {
                reg_lambda: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);

        group.throughput(Throughput::Elements(dataset.n_samples() as u64));
        for (label, parallelism) in [("seq", Parallelism::Sequential), ("par", Parallelism::Parallel)] {
            group.bench_function(BenchmarkId::new(name, label), |b| {
                b.iter(|| {
                    black_box(
                        trainer
                            .train(black_box(&binned), dataset.targets(), &[], parallelism)
                            .unwrap(),
                    )
                })
            });
        }
    }

    group.finish();
}

fn bench_model_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/model");
    let dataset = calories_dataset(15_000);

    group.throughput(Throughput::Elements(dataset.n_samples() as u64));
    group.bench_function("fit_default", |b| {
        b.iter(|| {
            let config = GBDTConfig::builder()
                .tree(TreeParams::depth_wise(6))
                .build()
                .unwrap();
            black_box(GBDTModel::train(black_box(&dataset), &[], config).unwrap())
        })
    });

    let model = GBDTModel::train(&dataset, &[], GBDTConfig::default()).unwrap();
    group.bench_function("predict", |b| {
        b.iter(|| black_box(model.predict(black_box(dataset.features())).unwrap()))
    });

    group.finish();
}

fn bench_explore(c: &mut Criterion) {
    let table = synthetic_table(15_000, 42);
    c.bench_function("explore/15000", |b| {
        b.iter(|| black_box(explore(black_box(&table), Parallelism::Parallel)))
    });
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_quantize, bench_trainer, bench_model_end_to_end, bench_explore
}
criterion_main!(benches);
