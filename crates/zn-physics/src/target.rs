//! Isotope-loaded liquid scintillator target (SNO+ Te-loaded LAB).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use zn_core::{Error, Result};

/// LAB density (kg/m³), Te verification report.
pub const DENSITY_LAB: f64 = 0.862e3;
/// Acrylic vessel volume (m³).
pub const AV_VOLUME: f64 = 903.3;
/// Isotopic abundance of Te130 in natural Te.
pub const TE130_MASS_FRACTION: f64 = 0.34696;
/// Default natural-Te loading fraction.
pub const DEFAULT_LOADING: f64 = 0.003;
/// Default fiducial-volume radius (m).
pub const DEFAULT_FV_RADIUS: f64 = 4.0;

/// Scintillator loaded with a double-beta isotope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadedScintillator {
    /// Scintillator density (kg/m³).
    pub density: f64,
    /// Total detector volume (m³).
    pub volume: f64,
    /// Isotopic mass fraction of the double-beta isotope in the loaded element.
    pub mass_fraction: f64,
    /// Mass fraction of the natural element dissolved in the scintillator.
    pub loading: f64,
    /// Fiducial-volume radius (m); `None` uses the full volume.
    pub fv_radius: Option<f64>,
}

impl Default for LoadedScintillator {
    fn default() -> Self {
        Self {
            density: DENSITY_LAB,
            volume: AV_VOLUME,
            mass_fraction: TE130_MASS_FRACTION,
            loading: DEFAULT_LOADING,
            fv_radius: Some(DEFAULT_FV_RADIUS),
        }
    }
}

impl LoadedScintillator {
    /// Isotope mass (kg) in the full vessel.
    pub fn isotope_mass(&self) -> f64 {
        self.density * self.volume * self.mass_fraction * self.loading
    }

    /// Isotope mass (kg) inside a sphere of `radius` metres.
    pub fn isotope_mass_in_fv(&self, radius: f64) -> f64 {
        let volume = radius.powi(3) * PI * (4.0 / 3.0);
        self.density * volume * self.mass_fraction * self.loading
    }

    /// Isotope mass after the configured fiducial-volume cut.
    pub fn target_mass(&self) -> Result<f64> {
        match self.fv_radius {
            Some(r) if !(r > 0.0 && r.is_finite()) => {
                Err(Error::Validation(format!("fiducial radius must be > 0, got {}", r)))
            }
            Some(r) => {
                if r.powi(3) * PI * (4.0 / 3.0) > self.volume {
                    log::warn!("fiducial sphere of radius {} m is larger than the vessel", r);
                }
                Ok(self.isotope_mass_in_fv(r))
            }
            None => Ok(self.isotope_mass()),
        }
    }
}
