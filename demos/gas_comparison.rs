//! Holdout comparison of the three strategies on a monthly series.
//!
//! Run with `cargo run --example gas_comparison [path/to/consumption.csv]`.
//! Without a path the bundled airline passenger series is used. Set
//! `RUST_LOG=forecast_holdout=debug` to see every ARIMA candidate.

use forecast_holdout::core::Frequency;
use forecast_holdout::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut registry = DatasetRegistry::with_builtins();
    let dataset = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ForecastError::DataNotFound(format!("{}: {}", path, e)))?;
            registry.register_csv("gas", text, Frequency::Monthly, 12)?;
            "gas"
        }
        None => AIR_PASSENGERS,
    };

    let config = match std::env::var("HOLDOUT_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ForecastError::Config(format!("{}: {}", path, e)))?;
            PipelineConfig::from_toml_str(&text)?
        }
        Err(_) => PipelineConfig::default(),
    };

    let report = Pipeline::new(config).run_dataset(&registry, dataset)?;
    println!("{}", report);

    for (rank, (name, rmse)) in report.ranking_by(Metric::Rmse).iter().enumerate() {
        println!("{}. {} (RMSE {:.2})", rank + 1, name, rmse);
    }

    for result in report.succeeded() {
        if let Some(diagnostics) = &result.diagnostics {
            let lb = &diagnostics.ljung_box;
            println!(
                "{}: Ljung-Box Q={:.2} on {} lags, p={:.3}{}",
                result.name,
                lb.statistic,
                lb.lags,
                lb.p_value,
                if lb.is_white_noise(0.05) { "" } else { " (residuals correlated)" }
            );
        }
    }

    Ok(())
}
