//! Pseudo-data generation (Asimov + Poisson).
//!
//! The limit scanner compares against the background itself by default,
//! which is the Asimov dataset of the background-only hypothesis. Poisson
//! toys give a fluctuated dataset to pass through `LimitScanner::with_data`.

use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use zn_core::{Error, Result, Spectrum};

/// Asimov (expected) dataset: the spectrum itself.
pub fn asimov(expected: &Spectrum) -> Spectrum {
    let mut out = expected.clone();
    out.set_label(format!("asimov({})", expected.label()));
    out
}

/// One Poisson-fluctuated dataset, deterministic for a given `seed`.
pub fn poisson_fluctuate(expected: &Spectrum, seed: u64) -> Result<Spectrum> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let contents = expected
        .contents()
        .iter()
        .map(|&lam| {
            if !lam.is_finite() || lam <= 0.0 {
                // Poisson(0) is deterministically 0.
                return Ok(0.0);
            }
            let pois = Poisson::new(lam)
                .map_err(|e| Error::Computation(format!("Poisson({}): {}", lam, e)))?;
            Ok(pois.sample(&mut rng))
        })
        .collect::<Result<Vec<f64>>>()?;
    Spectrum::from_contents(
        format!("toy({})", expected.label()),
        expected.e_lo(),
        expected.e_hi(),
        contents,
    )
}

/// `n_toys` Poisson datasets; toy `i` uses seed `seed + i`.
pub fn poisson_toys(expected: &Spectrum, n_toys: usize, seed: u64) -> Result<Vec<Spectrum>> {
    (0..n_toys).map(|i| poisson_fluctuate(expected, seed.wrapping_add(i as u64))).collect()
}
