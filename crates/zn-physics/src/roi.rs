//! Named regions of interest around the 0νββ Q-value.

use zn_core::{EnergyRange, Error, Result};

// SNO+-doc-1720-v7, "External Background Simulation Studies for NewNd".
const ROIS: [(&str, f64, f64); 3] = [
    ("reconstructed_energy", 2.40, 2.64),
    ("gaussian_smeared_mc_energy", 2.450, 2.635),
    ("nhit_over_180", 2.53, 2.89),
];

/// Energy window with a centre and half-width, adjustable in units of the half-width.
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    name: String,
    range: EnergyRange,
    mu: f64,
    sigma: f64,
}

impl Roi {
    /// Look up a tabulated ROI.
    pub fn named(name: &str) -> Result<Self> {
        let (_, lo, hi) = ROIS.iter().find(|(n, _, _)| *n == name).copied().ok_or_else(|| {
            let known: Vec<&str> = ROIS.iter().map(|r| r.0).collect();
            Error::Validation(format!("unknown ROI '{}' (known: {})", name, known.join(", ")))
        })?;
        Self::new(name, lo, hi)
    }

    /// Custom ROI `[lo, hi]` (MeV).
    pub fn new(name: impl Into<String>, lo: f64, hi: f64) -> Result<Self> {
        let range = EnergyRange::new(lo, hi)?;
        let mu = (lo + hi) / 2.0;
        Ok(Self { name: name.into(), range, mu, sigma: hi - mu })
    }

    /// ROI name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current energy window.
    pub fn range(&self) -> EnergyRange {
        self.range
    }

    /// Move the lower edge to `mu + offset * sigma`.
    pub fn set_lower_by_sigma(&mut self, offset: f64) -> Result<()> {
        self.range = EnergyRange::new(self.mu + offset * self.sigma, self.range.hi)?;
        Ok(())
    }

    /// Move the upper edge to `mu + offset * sigma`.
    pub fn set_upper_by_sigma(&mut self, offset: f64) -> Result<()> {
        self.range = EnergyRange::new(self.range.lo, self.mu + offset * self.sigma)?;
        Ok(())
    }
}
