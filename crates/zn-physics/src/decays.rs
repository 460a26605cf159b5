//! Expected decay counts.

use std::f64::consts::LN_2;

/// Expected decays `ln2 · N · L / T½` for `number_nuclei` target nuclei over
/// `livetime` years.
#[inline]
pub fn decays_from_half_life(t_half: f64, number_nuclei: f64, livetime: f64) -> f64 {
    LN_2 / t_half * number_nuclei * livetime
}

/// Expected decays `ln2 · N · L · (m_ββ / c)²`, with `c` the converter's
/// conversion factor.
#[inline]
pub fn decays_from_mass(
    effective_mass: f64,
    number_nuclei: f64,
    livetime: f64,
    conversion_factor: f64,
) -> f64 {
    LN_2 * (effective_mass / conversion_factor).powi(2) * number_nuclei * livetime
}
