//! Lag polynomials, stability checks and the stationarity-preserving
//! reparameterization used while estimating SARIMA coefficients.
//!
//! Polynomials are stored by ascending power of the backshift operator,
//! `[c0, c1, ..., ck]` for `c0 + c1*B + ... + ck*B^k`.

/// Product of two lag polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 + c1*B^s + c2*B^2s + ...` from the coefficients `c`.
pub fn seasonal_factor(coefficients: &[f64], period: usize) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * period + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * period] = c;
    }
    poly
}

/// AR operator `1 - φ1*B - ... - φp*B^p`.
pub fn ar_operator(phi: &[f64]) -> Vec<f64> {
    std::iter::once(1.0).chain(phi.iter().map(|c| -c)).collect()
}

/// MA operator `1 + θ1*B + ... + θq*B^q`.
pub fn ma_operator(theta: &[f64]) -> Vec<f64> {
    std::iter::once(1.0).chain(theta.iter().copied()).collect()
}

/// Schur-Cohn step-down test for `1 - φ1*z - ... - φp*z^p`.
///
/// Returns true when every root lies strictly outside the unit circle,
/// i.e. every partial autocorrelation recovered by the step-down
/// recursion has modulus below one.
pub fn is_stationary(phi: &[f64]) -> bool {
    let mut a: Vec<f64> = phi.to_vec();
    while let Some(&0.0) = a.last() {
        a.pop();
    }

    while let Some(&k) = a.last() {
        if !k.is_finite() || k.abs() >= 1.0 {
            return false;
        }
        let p = a.len();
        let denom = 1.0 - k * k;
        let reduced: Vec<f64> = (0..p - 1)
            .map(|j| (a[j] + k * a[p - 2 - j]) / denom)
            .collect();
        a = reduced;
    }
    true
}

/// Invertibility of `1 + θ1*z + ... + θq*z^q` (roots outside the unit circle).
pub fn is_invertible(theta: &[f64]) -> bool {
    let negated: Vec<f64> = theta.iter().map(|c| -c).collect();
    is_stationary(&negated)
}

/// Map partial autocorrelations in `(-1, 1)` to stationary AR coefficients
/// with the Durbin-Levinson recursion.
pub fn partials_to_coefficients(partials: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, &r) in partials.iter().enumerate() {
        let previous = phi.clone();
        for j in 0..k {
            phi[j] = previous[j] - r * previous[k - 1 - j];
        }
        phi.push(r);
    }
    phi
}

/// Inverse of [`partials_to_coefficients`] for stationary coefficients.
///
/// Returns `None` if the coefficients are not stationary.
pub fn coefficients_to_partials(phi: &[f64]) -> Option<Vec<f64>> {
    let mut a = phi.to_vec();
    let mut partials = vec![0.0; phi.len()];
    for p in (1..=phi.len()).rev() {
        let k = a[p - 1];
        if !k.is_finite() || k.abs() >= 1.0 {
            return None;
        }
        partials[p - 1] = k;
        let denom = 1.0 - k * k;
        a = (0..p - 1)
            .map(|j| (a[j] + k * a[p - 2 - j]) / denom)
            .collect();
    }
    Some(partials)
}

/// Unconstrained values to stationary AR coefficients, via `tanh`.
pub fn transform_ar(raw: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = raw.iter().map(|x| x.tanh()).collect();
    partials_to_coefficients(&partials)
}

/// Unconstrained values to invertible MA coefficients.
pub fn transform_ma(raw: &[f64]) -> Vec<f64> {
    transform_ar(raw).into_iter().map(|c| -c).collect()
}
