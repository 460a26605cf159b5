//! Target isotope: number of nuclei and expected decay counts.

use crate::constants::{self, N_AVOGADRO};
use crate::converter::{warn_clamped, ZeroNuConverter};
use crate::decays;
use zn_core::{Clamped, Error, NuclearConverter, Result};

/// Expected decays together with the (possibly clamped) parameter used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedDecays {
    /// Expected number of decays.
    pub events: f64,
    /// Half-life or mass actually used.
    pub used: Clamped,
}

/// Number of nuclei in `mass_kg` of an isotope with `atomic_weight` (g/mol).
pub fn number_nuclei_for_mass(mass_kg: f64, atomic_weight: f64) -> f64 {
    mass_kg * 1e3 * N_AVOGADRO / atomic_weight
}

/// A double-beta isotope deployed as a target of known size.
#[derive(Debug, Clone)]
pub struct Isotope {
    converter: ZeroNuConverter,
    number_nuclei: f64,
}

impl Isotope {
    /// Target holding `number_nuclei` nuclei of `name`.
    pub fn with_number_nuclei(name: &str, number_nuclei: f64) -> Result<Self> {
        if !number_nuclei.is_finite() || number_nuclei <= 0.0 {
            return Err(Error::Validation(format!(
                "number of nuclei must be finite and > 0, got {}",
                number_nuclei
            )));
        }
        Ok(Self { converter: ZeroNuConverter::new(name)?, number_nuclei })
    }

    /// Target of `mass_kg` kilograms of pure `name`.
    pub fn with_target_mass(name: &str, mass_kg: f64) -> Result<Self> {
        let data = constants::isotope(name)?;
        Self::with_number_nuclei(name, number_nuclei_for_mass(mass_kg, data.atomic_weight))
    }

    /// Isotope name.
    pub fn name(&self) -> &'static str {
        self.converter.isotope()
    }

    /// Number of target nuclei.
    pub fn number_nuclei(&self) -> f64 {
        self.number_nuclei
    }

    /// Half-life ↔ mass converter of this isotope.
    pub fn converter(&self) -> &ZeroNuConverter {
        &self.converter
    }

    /// Expected decays in `livetime` years for half-life `t_half`, clamped to the valid range.
    pub fn decays_from_half_life(&self, t_half: f64, livetime: f64) -> ExpectedDecays {
        let used = self.converter.clamp_half_life(t_half);
        warn_clamped("half-life", "y", &used);
        ExpectedDecays {
            events: decays::decays_from_half_life(used.value, self.number_nuclei, livetime),
            used,
        }
    }

    /// Expected decays in `livetime` years for effective mass `mass`, clamped to the valid range.
    pub fn decays_from_mass(&self, mass: f64, livetime: f64) -> ExpectedDecays {
        let used = self.converter.clamp_mass(mass);
        warn_clamped("effective mass", "eV", &used);
        ExpectedDecays {
            events: decays::decays_from_mass(
                used.value,
                self.number_nuclei,
                livetime,
                self.converter.conversion_factor(),
            ),
            used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn snoplus_te() -> Isotope {
        Isotope::with_target_mass("Te130", 240.53402185501733).unwrap()
    }

    #[test]
    fn test_number_nuclei() {
        assert_relative_eq!(snoplus_te().number_nuclei(), 1.1150580505749745e27, max_relative = 1e-12);
    }

    #[test]
    fn test_decays_reference_values() {
        let te = snoplus_te();
        let d = te.decays_from_half_life(5e25, 1.0);
        assert_relative_eq!(d.events, 15.457986878334248, max_relative = 1e-12);
        assert!(!d.used.was_clamped());

        let d = te.decays_from_mass(0.0933806512323, 1.0);
        assert_relative_eq!(d.events, 15.45798687833113, max_relative = 1e-10);
    }

    #[test]
    fn test_extremes_clamp_to_same_counts() {
        let te = snoplus_te();
        let c = te.converter();
        let mass_max = c.half_life_to_mass(0.0);
        let t_half_min = c.mass_to_half_life(mass_max);
        let t_half_max = c.mass_to_half_life(0.0);
        let mass_min = c.half_life_to_mass(t_half_max);

        assert_relative_eq!(te.decays_from_mass(mass_max, 1.0).events / 1e16, 1.2947514665383534, max_relative = 1e-11);
        assert_relative_eq!(te.decays_from_half_life(t_half_min, 1.0).events / 1e16, 1.2947514665383534, max_relative = 1e-11);
        assert_relative_eq!(te.decays_from_mass(mass_min, 1.0).events / 1e-5, 1.2947514665383534, max_relative = 1e-11);
        assert_relative_eq!(te.decays_from_half_life(t_half_max, 1.0).events / 1e-5, 1.2947514665383534, max_relative = 1e-11);
    }

    #[test]
    fn test_clamped_half_life_reports_bound() {
        let te = snoplus_te();
        let d = te.decays_from_half_life(0.0, 1.0);
        assert_eq!(d.used.bound, Some(zn_core::Bound::Lower));
        assert!(d.events.is_finite());
    }

    #[test]
    fn test_invalid_nuclei() {
        assert!(Isotope::with_number_nuclei("Te130", 0.0).is_err());
        assert!(Isotope::with_number_nuclei("Te130", f64::NAN).is_err());
    }
}
