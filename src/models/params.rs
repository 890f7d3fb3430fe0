//! Fitted coefficients exposed by every strategy.

use crate::models::arima::ArimaParameters;
use crate::models::baseline::NaiveMethod;
use crate::models::exponential::HoltWintersParameters;
use serde::Serialize;

/// Strategy-specific fitted coefficients, immutable once produced by `fit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelParameters {
    Naive {
        method: NaiveMethod,
        value: f64,
        /// Residual standard deviation, NaN when undefined.
        sigma: f64,
    },
    HoltWinters(HoltWintersParameters),
    Arima(ArimaParameters),
}

impl ModelParameters {
    /// Number of fitted ARMA coefficients, used as Ljung-Box degrees of
    /// freedom correction.
    pub fn fitted_coefficients(&self) -> usize {
        match self {
            Self::Arima(p) => p.order.num_coefficients(),
            Self::Naive { .. } | Self::HoltWinters(_) => 0,
        }
    }

    /// One-line human readable description.
    pub fn summary(&self) -> String {
        match self {
            Self::Naive { method, value, .. } => {
                format!("naive {:?} = {:.4}", method, value).to_lowercase()
            }
            Self::HoltWinters(p) => format!(
                "alpha={:.4} beta={:.4} gamma={:.4} ({:?}, period {})",
                p.alpha, p.beta, p.gamma, p.seasonal_type, p.period
            ),
            Self::Arima(p) => format!("{} aicc={:.2} sigma2={:.4}", p.order, p.aicc, p.sigma2),
        }
    }
}
