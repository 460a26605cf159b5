//! Fixed-binning energy spectrum.
//!
//! A [`Spectrum`] is a value type: counts per bin over a uniform energy axis
//! `[e_lo, e_hi)`. Scaling either mutates an owned spectrum in place
//! ([`Spectrum::scale_to`]) or returns a new one ([`Spectrum::scaled_to`]);
//! nothing in the likelihood code ever rescales a spectrum it only borrowed.

use serde::{Deserialize, Serialize};

use crate::types::EnergyRange;
use crate::{Error, Result};

/// 1-D histogram of event counts versus energy (MeV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpectrumRepr", into = "SpectrumRepr")]
pub struct Spectrum {
    label: String,
    e_lo: f64,
    e_hi: f64,
    contents: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct SpectrumRepr {
    #[serde(default)]
    label: String,
    e_lo: f64,
    e_hi: f64,
    contents: Vec<f64>,
}

impl TryFrom<SpectrumRepr> for Spectrum {
    type Error = Error;

    fn try_from(r: SpectrumRepr) -> Result<Self> {
        Spectrum::from_contents(r.label, r.e_lo, r.e_hi, r.contents)
    }
}

impl From<Spectrum> for SpectrumRepr {
    fn from(s: Spectrum) -> Self {
        SpectrumRepr { label: s.label, e_lo: s.e_lo, e_hi: s.e_hi, contents: s.contents }
    }
}

fn validate_axis(e_lo: f64, e_hi: f64, n_bins: usize) -> Result<()> {
    if !(e_lo.is_finite() && e_hi.is_finite()) || e_lo >= e_hi {
        return Err(Error::Validation(format!(
            "spectrum axis must satisfy e_lo < e_hi, got [{}, {})",
            e_lo, e_hi
        )));
    }
    if n_bins == 0 {
        return Err(Error::Validation("spectrum must have at least one bin".to_string()));
    }
    Ok(())
}

impl Spectrum {
    /// Empty spectrum with `n_bins` uniform bins over `[e_lo, e_hi)`.
    pub fn new(label: impl Into<String>, n_bins: usize, e_lo: f64, e_hi: f64) -> Result<Self> {
        validate_axis(e_lo, e_hi, n_bins)?;
        Ok(Self { label: label.into(), e_lo, e_hi, contents: vec![0.0; n_bins] })
    }

    /// Spectrum from explicit bin contents. Counts must be finite and non-negative.
    pub fn from_contents(
        label: impl Into<String>,
        e_lo: f64,
        e_hi: f64,
        contents: Vec<f64>,
    ) -> Result<Self> {
        validate_axis(e_lo, e_hi, contents.len())?;
        if let Some((i, c)) = contents.iter().enumerate().find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(Error::Validation(format!(
                "bin {} has invalid count {} (must be finite and >= 0)",
                i, c
            )));
        }
        Ok(Self { label: label.into(), e_lo, e_hi, contents })
    }

    /// Uniform bins with `bin_width` over `[e_lo, e_hi)`; `n = floor((e_hi - e_lo) / bin_width)`.
    ///
    /// The upper edge is adjusted to `e_lo + n * bin_width`.
    pub fn with_bin_width(
        label: impl Into<String>,
        bin_width: f64,
        e_lo: f64,
        e_hi: f64,
    ) -> Result<Self> {
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(Error::Validation(format!("bin width must be > 0, got {}", bin_width)));
        }
        let n = ((e_hi - e_lo) / bin_width + 1e-9).floor();
        if !n.is_finite() || n < 1.0 {
            return Err(Error::Validation(format!(
                "bin width {} does not fit in [{}, {})",
                bin_width, e_lo, e_hi
            )));
        }
        let n = n as usize;
        Self::new(label, n, e_lo, e_lo + n as f64 * bin_width)
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Lower edge of the axis.
    pub fn e_lo(&self) -> f64 {
        self.e_lo
    }

    /// Upper edge of the axis.
    pub fn e_hi(&self) -> f64 {
        self.e_hi
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.contents.len()
    }

    /// Uniform bin width.
    pub fn bin_width(&self) -> f64 {
        (self.e_hi - self.e_lo) / self.contents.len() as f64
    }

    /// Low edge of bin `i` (0-based).
    pub fn bin_low_edge(&self, i: usize) -> f64 {
        self.e_lo + i as f64 * self.bin_width()
    }

    /// Content of bin `i` (0-based). Panics if out of range, like slice indexing.
    pub fn bin_content(&self, i: usize) -> f64 {
        self.contents[i]
    }

    /// All bin contents.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Bin index containing `energy`, if inside `[e_lo, e_hi)`.
    pub fn find_bin(&self, energy: f64) -> Option<usize> {
        if !(energy >= self.e_lo && energy < self.e_hi) {
            return None;
        }
        let i = ((energy - self.e_lo) / self.bin_width()).floor() as usize;
        Some(i.min(self.contents.len() - 1))
    }

    /// Add `weight` to the bin containing `energy`. Energies outside the axis are dropped.
    pub fn fill(&mut self, energy: f64, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::Validation(format!("fill weight must be >= 0, got {}", weight)));
        }
        if let Some(i) = self.find_bin(energy) {
            self.contents[i] += weight;
        }
        Ok(())
    }

    /// Short description of the binning, used in error messages.
    pub fn binning(&self) -> String {
        format!("{} bins [{}, {})", self.contents.len(), self.e_lo, self.e_hi)
    }

    /// Identical bin count and bin edges.
    pub fn is_compatible(&self, other: &Spectrum) -> bool {
        self.contents.len() == other.contents.len()
            && self.e_lo == other.e_lo
            && self.e_hi == other.e_hi
    }

    /// `Ok(())` if compatible, `ShapeMismatch` otherwise.
    pub fn check_compatible(&self, other: &Spectrum) -> Result<()> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(Error::ShapeMismatch { left: self.binning(), right: other.binning() })
        }
    }

    /// Total number of events.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Inclusive bin span covering `range`, clamped to the axis.
    ///
    /// First bin is `floor((lo - e_lo) / width)`, last is `floor((hi - e_lo) / width)`.
    pub fn bin_span(&self, range: &EnergyRange) -> Option<(usize, usize)> {
        if range.hi < self.e_lo || range.lo >= self.e_hi {
            return None;
        }
        let w = self.bin_width();
        let last_bin = self.contents.len() - 1;
        let first = ((range.lo - self.e_lo) / w).floor().max(0.0) as usize;
        let last = ((range.hi - self.e_lo) / w).floor().max(0.0) as usize;
        Some((first.min(last_bin), last.min(last_bin)))
    }

    /// Number of events inside `range`.
    pub fn integral_in(&self, range: &EnergyRange) -> f64 {
        match self.bin_span(range) {
            Some((first, last)) => self.contents[first..=last].iter().sum(),
            None => 0.0,
        }
    }

    /// Rescale in place so that the total (or `range`) integral equals `target`.
    ///
    /// Every bin is multiplied by the same factor, including bins outside `range`.
    pub fn scale_to(&mut self, target: f64, range: Option<&EnergyRange>) -> Result<()> {
        if !target.is_finite() || target < 0.0 {
            return Err(Error::Validation(format!(
                "scale target must be finite and >= 0, got {}",
                target
            )));
        }
        let current = match range {
            Some(r) => self.integral_in(r),
            None => self.integral(),
        };
        if current == 0.0 {
            if target == 0.0 {
                return Ok(());
            }
            return Err(Error::DegenerateSpectrum(format!(
                "'{}' has zero integral{}, cannot scale to {}",
                self.label,
                if range.is_some() { " in range" } else { "" },
                target
            )));
        }
        self.scale_by(target / current);
        Ok(())
    }

    /// Copy of `self` rescaled to `target`; `self` is untouched.
    pub fn scaled_to(&self, target: f64, range: Option<&EnergyRange>) -> Result<Spectrum> {
        let mut out = self.clone();
        out.scale_to(target, range)?;
        Ok(out)
    }

    /// Multiply every bin by `factor`.
    pub fn scale_by(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
    }

    /// Bin-wise sum of two compatible spectra.
    pub fn try_add(&self, other: &Spectrum) -> Result<Spectrum> {
        self.check_compatible(other)?;
        let contents = self.contents.iter().zip(&other.contents).map(|(a, b)| a + b).collect();
        Ok(Spectrum {
            label: format!("{} + {}", self.label, other.label),
            e_lo: self.e_lo,
            e_hi: self.e_hi,
            contents,
        })
    }

    /// Same binning, all bins zero.
    pub fn zeroed(&self) -> Spectrum {
        Spectrum {
            label: self.label.clone(),
            e_lo: self.e_lo,
            e_hi: self.e_hi,
            contents: vec![0.0; self.contents.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat(n: usize, v: f64) -> Spectrum {
        Spectrum::from_contents("flat", 0.0, n as f64 * 0.5, vec![v; n]).unwrap()
    }

    #[test]
    fn test_axis_validation() {
        assert!(Spectrum::new("x", 0, 0.0, 1.0).is_err());
        assert!(Spectrum::new("x", 10, 1.0, 1.0).is_err());
        assert!(Spectrum::from_contents("x", 0.0, 1.0, vec![1.0, -1.0]).is_err());
        assert!(Spectrum::from_contents("x", 0.0, 1.0, vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_edges_and_fill() {
        let mut s = Spectrum::with_bin_width("s", 0.02, 0.0, 3.5).unwrap();
        assert_eq!(s.bin_count(), 175);
        assert_relative_eq!(s.bin_width(), 0.02, epsilon = 1e-12);
        assert_relative_eq!(s.bin_low_edge(10), 0.2, epsilon = 1e-12);

        s.fill(2.53, 1.0).unwrap();
        s.fill(-1.0, 1.0).unwrap();
        s.fill(3.6, 1.0).unwrap();
        assert_eq!(s.integral(), 1.0);
        assert_eq!(s.find_bin(2.53), Some(126));
        assert!(s.fill(1.0, -2.0).is_err());
    }

    #[test]
    fn test_scale_to_total_and_range() {
        let mut s = flat(10, 10.0);
        s.scale_to(50.0, None).unwrap();
        assert_relative_eq!(s.integral(), 50.0, epsilon = 1e-12);

        let roi = EnergyRange::new(1.0, 1.9).unwrap();
        // bins 2..=3 are inside [1.0, 1.9]
        assert_eq!(s.bin_span(&roi), Some((2, 3)));
        s.scale_to(4.0, Some(&roi)).unwrap();
        assert_relative_eq!(s.integral_in(&roi), 4.0, epsilon = 1e-12);
        assert_relative_eq!(s.integral(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaled_to_leaves_original() {
        let s = flat(4, 1.0);
        let t = s.scaled_to(8.0, None).unwrap();
        assert_eq!(s.integral(), 4.0);
        assert_eq!(t.integral(), 8.0);
    }

    #[test]
    fn test_scale_degenerate() {
        let mut s = flat(4, 0.0);
        assert!(matches!(s.scale_to(1.0, None), Err(Error::DegenerateSpectrum(_))));
        assert!(s.scale_to(0.0, None).is_ok());
    }

    #[test]
    fn test_try_add_shape_guard() {
        let a = flat(10, 1.0);
        let b = flat(12, 1.0);
        assert!(matches!(a.try_add(&b), Err(Error::ShapeMismatch { .. })));
        let c = a.try_add(&a).unwrap();
        assert_eq!(c.integral(), 20.0);
        assert_eq!(c.label(), "flat + flat");
    }

    #[test]
    fn test_serde_validates() {
        let ok: Spectrum =
            serde_json::from_str(r#"{"label":"b","e_lo":0.0,"e_hi":1.0,"contents":[1.0,2.0]}"#)
                .unwrap();
        assert_eq!(ok.bin_count(), 2);
        let bad = serde_json::from_str::<Spectrum>(r#"{"e_lo":1.0,"e_hi":0.0,"contents":[1.0]}"#);
        assert!(bad.is_err());
    }
}
