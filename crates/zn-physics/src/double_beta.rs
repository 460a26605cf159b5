//! Two-neutrino double-beta decay properties.

use crate::constants::{self, IsotopeData};
use zn_core::{Error, Result};

/// Default lower half-life bound, as a multiple of the 2νββ half-life.
pub const T_HALF_MIN_SCALING: f64 = 1.0e-6;
/// Default upper half-life bound, as a multiple of the 2νββ half-life.
pub const T_HALF_MAX_SCALING: f64 = 1.0e15;

/// Standard-model (2νββ) decay of an isotope, used to anchor the valid
/// half-life range of the 0νββ conversion.
#[derive(Debug, Clone)]
pub struct DoubleBeta {
    data: &'static IsotopeData,
    t_half_min: f64,
    t_half_max: f64,
}

impl DoubleBeta {
    /// Isotope with the default bound scalings (`1e-6`, `1e15`).
    pub fn new(isotope_name: &str) -> Result<Self> {
        Self::with_scalings(isotope_name, T_HALF_MIN_SCALING, T_HALF_MAX_SCALING)
    }

    /// Isotope with custom bound scalings relative to the 2νββ half-life.
    pub fn with_scalings(isotope_name: &str, min_scaling: f64, max_scaling: f64) -> Result<Self> {
        if !(min_scaling > 0.0 && max_scaling > min_scaling && max_scaling.is_finite()) {
            return Err(Error::Validation(format!(
                "half-life scalings must satisfy 0 < min < max, got ({}, {})",
                min_scaling, max_scaling
            )));
        }
        let data = constants::isotope(isotope_name)?;
        let t_half = two_nu_half_life(data);
        Ok(Self { data, t_half_min: t_half * min_scaling, t_half_max: t_half * max_scaling })
    }

    /// Nuclear data of the isotope.
    pub fn data(&self) -> &'static IsotopeData {
        self.data
    }

    /// 2νββ half-life `1 / (G * |M|²)` (years).
    pub fn half_life(&self) -> f64 {
        two_nu_half_life(self.data)
    }

    /// Lower bound on any double-beta half-life considered physical.
    pub fn t_half_min(&self) -> f64 {
        self.t_half_min
    }

    /// Upper bound on any double-beta half-life considered physical.
    pub fn t_half_max(&self) -> f64 {
        self.t_half_max
    }
}

fn two_nu_half_life(data: &IsotopeData) -> f64 {
    1.0 / (data.two_nu.phase_space * data.two_nu.matrix_element.powi(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_te130_two_nu_half_life() {
        let db = DoubleBeta::new("Te130").unwrap();
        assert_relative_eq!(db.half_life(), 5.969480351183813e16, max_relative = 1e-14);
        assert_relative_eq!(db.t_half_min(), 5.969480351183813e10, max_relative = 1e-14);
        assert_relative_eq!(db.t_half_max(), 5.9694803511838125e31, max_relative = 1e-14);
    }

    #[test]
    fn test_invalid_scalings() {
        assert!(DoubleBeta::with_scalings("Te130", 0.0, 1.0).is_err());
        assert!(DoubleBeta::with_scalings("Te130", 10.0, 1.0).is_err());
        assert!(DoubleBeta::new("Ca48").is_err());
    }
}
