//! Statistical tests used for differencing decisions and residual checks.
//!
//! # Example
//!
//! ```
//! use forecast_holdout::validation::{kpss_test, ljung_box};
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05];
//! let lb = ljung_box(&residuals, 3, 0);
//! assert!(lb.p_value.is_finite());
//!
//! let series: Vec<f64> = (0..50).map(|i| i as f64).collect();
//! let kpss = kpss_test(&series, None);
//! assert!(!kpss.is_stationary(0.05));
//! ```

pub mod stationarity;

pub use residual_tests::{default_ljung_box_lags, ljung_box, LjungBoxResult, ResidualDiagnostics};
pub use stationarity::{
    adf_test, kpss_test, CriticalValues, StationarityResult, StationarityTest,
};
