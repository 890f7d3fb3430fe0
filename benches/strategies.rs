//! Benchmarks for fitting and forecasting each strategy on the bundled dataset.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forecast_holdout::config::PipelineConfig;
use forecast_holdout::core::split;
use forecast_holdout::data::{load_dataset, AIR_PASSENGERS};
use forecast_holdout::models::arima::{AutoArima, Sarima, SarimaOrder};
use forecast_holdout::models::baseline::Naive;
use forecast_holdout::models::exponential::HoltWinters;
use forecast_holdout::models::{Forecaster, StrategySpec};
use forecast_holdout::pipeline::Pipeline;

fn bench_strategies(c: &mut Criterion) {
    let series = load_dataset(AIR_PASSENGERS).unwrap();
    let parts = split(&series, 12).unwrap();

    let mut group = c.benchmark_group("fit_predict");
    let strategies = [
        StrategySpec::new("Naive", || Box::new(Naive::new())),
        StrategySpec::new("HoltWinters", || Box::new(HoltWinters::additive(12))),
        StrategySpec::new("SARIMA(0,1,1)(0,1,1)", || {
            Box::new(Sarima::new(SarimaOrder::seasonal((0, 1, 1), (0, 1, 1), 12)))
        }),
        StrategySpec::new("AutoArima", || Box::new(AutoArima::new())),
    ];

    for spec in &strategies {
        let id = BenchmarkId::new(spec.name(), parts.train.len());
        group.bench_with_input(id, &parts, |b, parts| {
            b.iter(|| {
                let mut model = spec.create();
                model.fit(black_box(&parts.train)).unwrap();
                model.predict_with_intervals(12, 0.95).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let series = load_dataset(AIR_PASSENGERS).unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default());

    c.bench_function("pipeline_air_passengers", |b| {
        b.iter(|| pipeline.run(black_box(&series)).unwrap())
    });
}

criterion_group!(benches, bench_strategies, bench_pipeline);
criterion_main!(benches);
