//! Ordinary least squares on a dense design matrix.
//!
//! Used by the unit-root regression and for SARIMA starting values.

/// Fitted least-squares regression.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// One coefficient per design column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Number of observations.
    pub n: usize,
}

impl LeastSquares {
    /// Residual variance with `n - k` degrees of freedom.
    pub fn sigma2(&self) -> f64 {
        let dof = self.n.saturating_sub(self.coefficients.len());
        if dof == 0 {
            return f64::NAN;
        }
        self.rss / dof as f64
    }
}

/// Solve `y = X b + e` by the normal equations.
///
/// `rows` holds one design row per observation; include a column of ones
/// for an intercept. Returns `None` if the system is rank deficient or
/// there are not more observations than columns.
pub fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Option<LeastSquares> {
    let n = rows.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let k = rows[0].len();
    if k == 0 || n <= k || rows.iter().any(|r| r.len() != k) {
        return None;
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in (i + 1)..k {
            xtx[i][j] = xtx[j][i];
        }
    }

    let l = cholesky(&xtx)?;
    let coefficients = cholesky_solve(&l, &xty);

    let rss: f64 = rows
        .iter()
        .zip(y)
        .map(|(row, &target)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (target - fitted).powi(2)
        })
        .sum();

    let sigma2 = rss / (n - k) as f64;
    let std_errors = (0..k)
        .map(|j| {
            let mut unit = vec![0.0; k];
            unit[j] = 1.0;
            let column = cholesky_solve(&l, &unit);
            (sigma2 * column[j]).max(0.0).sqrt()
        })
        .collect();

    Some(LeastSquares {
        coefficients,
        std_errors,
        rss,
        n,
    })
}

/// Lower-triangular factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 1e-12 * a[i][i].abs().max(1e-300) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}
