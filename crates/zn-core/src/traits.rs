//! Collaborator traits for zeronu
//!
//! The limit-setting code depends on these traits, not on a concrete isotope
//! table or on how signal spectra are produced.

use crate::spectrum::Spectrum;
use crate::types::{Clamped, Parameter};
use crate::Result;

/// Half-life ↔ effective-mass conversion for a 0νββ signal.
pub trait NuclearConverter: Send + Sync {
    /// Effective mass (eV) for a half-life (years). Out-of-range input is clamped.
    fn half_life_to_mass(&self, t_half: f64) -> f64;

    /// Half-life (years) for an effective mass (eV). Out-of-range input is clamped.
    fn mass_to_half_life(&self, mass: f64) -> f64;

    /// Valid half-life range `(min, max)` in years.
    fn t_half_bounds(&self) -> (f64, f64);

    /// Valid effective-mass range `(min, max)` in eV.
    fn mass_bounds(&self) -> (f64, f64);

    /// Factor `c` in `m_ββ = c / sqrt(T½)` (eV·yr^½).
    fn conversion_factor(&self) -> f64;

    /// Clamp a half-life into [`Self::t_half_bounds`].
    fn clamp_half_life(&self, t_half: f64) -> Clamped {
        Clamped::within(t_half, self.t_half_bounds())
    }

    /// Clamp an effective mass into [`Self::mass_bounds`].
    fn clamp_mass(&self, mass: f64) -> Clamped {
        Clamped::within(mass, self.mass_bounds())
    }
}

/// A signal spectrum realized at one parameter value.
#[derive(Debug, Clone)]
pub struct Realization {
    /// Scaled signal spectrum.
    pub spectrum: Spectrum,
    /// Expected number of signal events the spectrum was scaled to.
    pub expected_events: f64,
    /// Set when the requested parameter was outside the physical range.
    pub clamp: Option<Clamped>,
}

/// Produces signal spectra scaled to a signal strength and livetime.
pub trait SignalSource {
    /// Realize the signal at `parameter` for `livetime` years.
    fn realize(&mut self, parameter: Parameter, livetime: f64) -> Result<Realization>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRange;

    impl NuclearConverter for FixedRange {
        fn half_life_to_mass(&self, t_half: f64) -> f64 {
            self.conversion_factor() / self.clamp_half_life(t_half).value.sqrt()
        }

        fn mass_to_half_life(&self, mass: f64) -> f64 {
            (self.conversion_factor() / self.clamp_mass(mass).value).powi(2)
        }

        fn t_half_bounds(&self) -> (f64, f64) {
            (1.0, 100.0)
        }

        fn mass_bounds(&self) -> (f64, f64) {
            (0.1, 1.0)
        }

        fn conversion_factor(&self) -> f64 {
            1.0
        }
    }

    #[test]
    fn test_default_clamp_helpers() {
        let c = FixedRange;
        assert!(c.clamp_half_life(1000.0).was_clamped());
        assert!(!c.clamp_mass(0.5).was_clamped());
        assert_eq!(c.half_life_to_mass(0.0), 1.0);
        assert_eq!(c.mass_to_half_life(0.5), 4.0);
    }
}
