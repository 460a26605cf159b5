//! 0νββ half-life ↔ effective Majorana mass conversion.
//!
//! `m_ββ = c / sqrt(T½)` with `c = m_e / sqrt(G0ν · g_A⁴ · |M0ν|²)`, where
//! `m_e` is in eV so that `m_ββ` comes out in eV.

use crate::constants::{self, COUPLING_CONSTANT, ELECTRON_MASS_MEV};
use crate::double_beta::DoubleBeta;
use zn_core::{Bound, Clamped, NuclearConverter, Result};

/// Converter for one isotope, valid inside the half-life range anchored on
/// its 2νββ half-life.
#[derive(Debug, Clone)]
pub struct ZeroNuConverter {
    isotope: &'static str,
    conversion_factor: f64,
    t_half_min: f64,
    t_half_max: f64,
}

impl ZeroNuConverter {
    /// Converter with the default half-life range (`1e-6`..`1e15` × 2νββ half-life).
    pub fn new(isotope_name: &str) -> Result<Self> {
        Self::from_double_beta(&DoubleBeta::new(isotope_name)?)
    }

    /// Converter whose valid range is taken from `two_nu`.
    pub fn from_double_beta(two_nu: &DoubleBeta) -> Result<Self> {
        let data = two_nu.data();
        let zero_nu = constants::isotope(data.name)?.zero_nu;

        let electron_mass = ELECTRON_MASS_MEV * 1.0e6;
        let mut factor = electron_mass.powi(2);
        factor /= zero_nu.phase_space;
        factor /= COUPLING_CONSTANT.powi(4);
        factor /= zero_nu.matrix_element.powi(2);

        Ok(Self {
            isotope: data.name,
            conversion_factor: factor.sqrt(),
            t_half_min: two_nu.t_half_min(),
            t_half_max: two_nu.t_half_max(),
        })
    }

    /// Isotope name.
    pub fn isotope(&self) -> &'static str {
        self.isotope
    }

    fn raw_mass(&self, t_half: f64) -> f64 {
        self.conversion_factor * (1.0 / t_half).sqrt()
    }
}

/// Log a warning when `c` had to be clamped.
pub fn warn_clamped(what: &str, unit: &str, c: &Clamped) {
    if let Some(bound) = c.bound {
        let side = match bound {
            Bound::Lower => "minimum",
            Bound::Upper => "maximum",
        };
        log::warn!(
            "{} {:e} {} outside valid range; using {} {:e} {}",
            what,
            c.requested,
            unit,
            side,
            c.value,
            unit
        );
    }
}

impl NuclearConverter for ZeroNuConverter {
    fn half_life_to_mass(&self, t_half: f64) -> f64 {
        let t = self.clamp_half_life(t_half);
        warn_clamped("half-life", "y", &t);
        self.raw_mass(t.value)
    }

    fn mass_to_half_life(&self, mass: f64) -> f64 {
        let m = self.clamp_mass(mass);
        warn_clamped("effective mass", "eV", &m);
        (self.conversion_factor / m.value).powi(2)
    }

    fn t_half_bounds(&self) -> (f64, f64) {
        (self.t_half_min, self.t_half_max)
    }

    fn mass_bounds(&self) -> (f64, f64) {
        (self.raw_mass(self.t_half_max), self.raw_mass(self.t_half_min))
    }

    fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }
}
