//! Binned Poisson log-likelihood discrepancy between two spectra.
//!
//! Per bin, `LL(e, o) = -2 * (e - o + o * ln(o / e))`, i.e. twice the negative
//! log of the Poisson likelihood ratio of observing `o` when `e` is expected.
//! Spectrum sums take `|LL|` per bin and skip the first and last bin.
//! Both edge bins are excluded on purpose, not just the upper one.

use zn_core::{Result, Spectrum};

/// Per-bin log-likelihood `-2 * (expected - observed + observed * ln(observed / expected))`.
///
/// Bins where the ratio is undefined (`expected == 0`, `observed == 0`,
/// negative or non-finite inputs) contribute `0.0`.
#[inline]
pub fn log_likelihood(expected: f64, observed: f64) -> f64 {
    if expected == observed {
        return 0.0;
    }
    let ratio = observed / expected;
    if !(ratio > 0.0 && ratio.is_finite()) {
        return 0.0;
    }
    -2.0 * (expected - observed + observed * ratio.ln())
}

/// Interior bin range `1..n-1` shared by the sums below.
#[inline]
fn interior(n: usize) -> std::ops::Range<usize> {
    1..n.saturating_sub(1)
}

/// `Σ |LL(expected_i, observed_i)|` over every bin except the first and the last.
///
/// Fails with `ShapeMismatch` unless both spectra share bin count and edges.
pub fn sum_log_likelihood(expected: &Spectrum, observed: &Spectrum) -> Result<f64> {
    expected.check_compatible(observed)?;
    let e = expected.contents();
    let o = observed.contents();
    Ok(interior(e.len()).map(|i| log_likelihood(e[i], o[i]).abs()).sum())
}

/// `Σ (|LL(b + s, b)| - |LL(b, b)|)` over the interior bins: the likelihood
/// cost of observing only `background` when `signal` on top of it is expected.
pub fn sum_delta_log_likelihood(signal: &Spectrum, background: &Spectrum) -> Result<f64> {
    background.check_compatible(signal)?;
    let s = signal.contents();
    let b = background.contents();
    Ok(interior(b.len())
        .map(|i| log_likelihood(b[i] + s[i], b[i]).abs() - log_likelihood(b[i], b[i]).abs())
        .sum())
}
