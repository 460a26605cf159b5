//! Delta log-likelihood limit scans.
//!
//! The scanner steps a signal strength across a configured range, adds the
//! realized signal to a fixed background, scores the sum against the data
//! (by default the background itself), and reports the first point whose
//! delta log-likelihood reaches the required threshold.
//!
//! Half-life scans run on the decay-rate axis `1/T½`, where the likelihood
//! is smooth. Mass scans run on a linear `m_ββ` axis and report `2 × Δ`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use zn_core::{Error, Parameter, Result, SignalSource, Spectrum};

use crate::likelihood::sum_log_likelihood;

/// One-sided 90% CL threshold for one degree of freedom.
pub const DEFAULT_DELTA_CHI_SQUARED: f64 = 2.71;
/// Default livetime (years).
pub const DEFAULT_LIVETIME: f64 = 5.0;

const RANGE_TOLERANCE: f64 = 1e-9;
const MAX_SCAN_STEPS: usize = 10_000_000;

/// `Δχ²` threshold for a confidence level with one degree of freedom.
pub fn threshold_for_confidence_level(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(Error::Validation(format!(
            "confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }
    let dist = ChiSquared::new(1.0).map_err(|e| Error::Computation(e.to_string()))?;
    Ok(dist.inverse_cdf(confidence_level))
}

/// Inclusive scan range `lo, lo + step, ...` up to `hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRange {
    /// First scan value.
    pub lo: f64,
    /// Last reachable scan value.
    pub hi: f64,
    /// Outer step.
    pub step: f64,
    /// Fine step used around the first crossing (mass scans only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_step: Option<f64>,
}

impl ScanRange {
    /// Range without refinement.
    pub fn new(lo: f64, hi: f64, step: f64) -> Self {
        Self { lo, hi, step, inner_step: None }
    }

    /// Refine the bracketing interval of the first crossing with `inner_step`.
    pub fn with_inner_step(mut self, inner_step: f64) -> Self {
        self.inner_step = Some(inner_step);
        self
    }

    fn validate(&self, what: &str, positive_lo: bool) -> Result<()> {
        let Self { lo, hi, step, inner_step } = *self;
        if !(lo.is_finite() && hi.is_finite() && step.is_finite()) {
            return Err(Error::InvalidBounds(format!(
                "{} range must be finite, got lo={} hi={} step={}",
                what, lo, hi, step
            )));
        }
        if lo >= hi {
            return Err(Error::InvalidBounds(format!(
                "{} range needs lo < hi, got [{}, {}]",
                what, lo, hi
            )));
        }
        if step <= 0.0 {
            return Err(Error::InvalidBounds(format!("{} step must be > 0, got {}", what, step)));
        }
        if positive_lo && lo <= 0.0 {
            return Err(Error::InvalidBounds(format!("{} range needs lo > 0, got {}", what, lo)));
        }
        if lo < 0.0 {
            return Err(Error::InvalidBounds(format!("{} range needs lo >= 0, got {}", what, lo)));
        }
        if let Some(inner) = inner_step {
            if !(inner.is_finite() && inner > 0.0 && inner < step) {
                return Err(Error::InvalidBounds(format!(
                    "{} inner step must satisfy 0 < inner < step ({}), got {}",
                    what, step, inner
                )));
            }
            if step / inner >= MAX_SCAN_STEPS as f64 {
                return Err(Error::InvalidBounds(format!(
                    "{} inner step {} splits step {} into more than {} points",
                    what, inner, step, MAX_SCAN_STEPS
                )));
            }
        }
        if (hi - lo) / step >= MAX_SCAN_STEPS as f64 {
            return Err(Error::InvalidBounds(format!(
                "{} range [{}, {}] with step {} exceeds {} points",
                what, lo, hi, step, MAX_SCAN_STEPS
            )));
        }
        Ok(())
    }

    /// Scan values `lo + i * step` that do not exceed `hi` (within a relative `1e-9`).
    pub fn values(&self) -> Vec<f64> {
        stepped(self.lo, self.hi, self.step)
    }
}

fn stepped(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let limit = hi + RANGE_TOLERANCE * hi.abs().max(step);
    let mut out = Vec::new();
    let mut i = 0usize;
    loop {
        let v = lo + i as f64 * step;
        if v > limit {
            break;
        }
        out.push(v);
        i += 1;
    }
    out
}

/// Resolved limit-setting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Delta chi-squared a point must reach to be excluded.
    pub required_delta_chi_squared: f64,
    /// Detector livetime in years.
    pub livetime: f64,
    /// Half-life scan (years).
    pub half_life: ScanRange,
    /// Effective-mass scan (eV).
    pub mass: ScanRange,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            required_delta_chi_squared: DEFAULT_DELTA_CHI_SQUARED,
            livetime: DEFAULT_LIVETIME,
            half_life: ScanRange::new(0.5e24, 1.0e25, 0.5e24),
            mass: ScanRange::new(0.0, 0.27, 0.01),
        }
    }
}

impl LimitSettings {
    fn validate(&self) -> Result<()> {
        let t = self.required_delta_chi_squared;
        if !(t.is_finite() && t > 0.0) {
            return Err(Error::InvalidBounds(format!(
                "threshold must be finite and > 0, got {}",
                t
            )));
        }
        if !(self.livetime.is_finite() && self.livetime > 0.0) {
            return Err(Error::Validation(format!(
                "livetime must be > 0 years, got {}",
                self.livetime
            )));
        }
        Ok(())
    }
}

/// Axis a scan runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAxis {
    /// Decay rate `1/T½` (1/years).
    InverseHalfLife,
    /// Effective mass `m_ββ` (eV).
    EffectiveMass,
}

impl ScanAxis {
    /// Signal strength at axis value `value`.
    pub fn parameter(&self, value: f64) -> Parameter {
        match self {
            ScanAxis::InverseHalfLife => Parameter::HalfLife(1.0 / value),
            ScanAxis::EffectiveMass => Parameter::EffectiveMass(value),
        }
    }

    fn delta_scale(&self) -> f64 {
        match self {
            ScanAxis::InverseHalfLife => 1.0,
            ScanAxis::EffectiveMass => 2.0,
        }
    }
}

/// Scan value and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    /// Axis value (`1/T½` or `m_ββ`).
    pub value: f64,
    /// Summed log-likelihood, or delta for [`DeltaCurve`] points.
    pub score: f64,
}

/// Raw scores ordered by strictly increasing axis value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanCurve {
    /// Axis the values live on.
    pub axis: ScanAxis,
    /// Points, increasing in `value`.
    pub points: Vec<ScanPoint>,
}

impl ScanCurve {
    fn from_points(axis: ScanAxis, mut points: Vec<ScanPoint>) -> Self {
        points.sort_by(|a, b| a.value.total_cmp(&b.value));
        points.dedup_by(|a, b| a.value == b.value);
        Self { axis, points }
    }

    fn merge(&mut self, extra: Vec<ScanPoint>) {
        let mut points = std::mem::take(&mut self.points);
        points.extend(extra);
        *self = Self::from_points(self.axis, points);
    }

    /// Smallest score on the curve.
    pub fn min_score(&self) -> Option<f64> {
        self.points.iter().map(|p| p.score).min_by(f64::total_cmp)
    }

    /// Subtract the minimum score (and double it on the mass axis).
    pub fn delta(&self) -> DeltaCurve {
        let min = self.min_score().unwrap_or(0.0);
        let scale = self.axis.delta_scale();
        let points = self
            .points
            .iter()
            .map(|p| ScanPoint { value: p.value, score: scale * (p.score - min) })
            .collect();
        DeltaCurve { axis: self.axis, points }
    }
}

/// Score curve relative to its minimum; non-negative with an exact zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaCurve {
    /// Axis the values live on.
    pub axis: ScanAxis,
    /// Points, increasing in `value`.
    pub points: Vec<ScanPoint>,
}

impl DeltaCurve {
    /// First point in increasing `value` with delta `>= threshold`.
    pub fn first_crossing(&self, threshold: f64) -> Option<ScanPoint> {
        first_crossing(&self.points, threshold).map(|i| self.points[i])
    }

    /// Largest delta reached.
    pub fn max_delta(&self) -> f64 {
        self.points.iter().map(|p| p.score).fold(0.0, f64::max)
    }
}

/// Index of the first point whose score is `>= threshold`.
pub fn first_crossing(points: &[ScanPoint], threshold: f64) -> Option<usize> {
    points.iter().position(|p| p.score >= threshold)
}

/// Observable scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    /// Constructed, nothing scanned yet.
    Initialized,
    /// Realizing and scoring scan points.
    Scanning,
    /// Raw and delta curves available.
    CurveBuilt,
    /// The last scan crossed the threshold.
    LimitFound,
    /// The last scan never reached the threshold.
    LimitNotFound,
}

/// Excluded signal strength at the threshold crossing.
#[derive(Debug, Clone, Serialize)]
pub struct LimitResult {
    /// Signal strength at the crossing (`T½` for half-life scans, `m_ββ` for mass scans).
    pub parameter: Parameter,
    /// Axis value at the crossing.
    pub scan_value: f64,
    /// Delta reached at the crossing.
    pub delta: f64,
    /// Threshold used.
    pub threshold: f64,
    /// Expected signal events at the crossing.
    pub expected_events: f64,
    /// Signal spectrum realized at the crossing.
    pub signal: Spectrum,
    /// Background plus signal at the crossing.
    pub candidate: Spectrum,
    /// Raw score curve.
    pub curve: ScanCurve,
    /// Delta curve.
    pub delta_curve: DeltaCurve,
    /// Scan points whose parameter was clamped into the physical range.
    pub clamped_points: usize,
}

/// Scan that never reached the threshold.
#[derive(Debug, Clone, Serialize)]
pub struct NoCrossing {
    /// Threshold used.
    pub threshold: f64,
    /// Largest delta reached.
    pub max_delta: f64,
    /// Raw score curve.
    pub curve: ScanCurve,
    /// Delta curve.
    pub delta_curve: DeltaCurve,
    /// Scan points whose parameter was clamped into the physical range.
    pub clamped_points: usize,
}

/// Result of a limit scan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LimitOutcome {
    /// A scan point reached the threshold.
    Found(LimitResult),
    /// No scan point reached the threshold.
    NotFound(NoCrossing),
}

impl LimitOutcome {
    /// The limit, if one was found.
    pub fn limit(&self) -> Option<&LimitResult> {
        match self {
            LimitOutcome::Found(r) => Some(r),
            LimitOutcome::NotFound(_) => None,
        }
    }

    /// Delta curve of the scan.
    pub fn delta_curve(&self) -> &DeltaCurve {
        match self {
            LimitOutcome::Found(r) => &r.delta_curve,
            LimitOutcome::NotFound(n) => &n.delta_curve,
        }
    }
}

/// Delta log-likelihood limit scanner over a fixed background.
pub struct LimitScanner<S: SignalSource> {
    background: Spectrum,
    data: Option<Spectrum>,
    source: S,
    settings: LimitSettings,
    cancel: Option<Arc<AtomicBool>>,
    phase: ScanPhase,
}

impl<S: SignalSource> LimitScanner<S> {
    /// Scanner comparing background + signal against the background alone.
    pub fn new(background: Spectrum, source: S, settings: LimitSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            background,
            data: None,
            source,
            settings,
            cancel: None,
            phase: ScanPhase::Initialized,
        })
    }

    /// Compare against `data` instead of the background.
    pub fn with_data(mut self, data: Spectrum) -> Result<Self> {
        self.background.check_compatible(&data)?;
        self.data = Some(data);
        Ok(self)
    }

    /// Abort scans with [`Error::Cancelled`] once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Resolved settings.
    pub fn settings(&self) -> &LimitSettings {
        &self.settings
    }

    /// Current phase.
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Background spectrum.
    pub fn background(&self) -> &Spectrum {
        &self.background
    }

    /// Signal source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Half-life limit over `range` (years), scanned on the `1/T½` axis.
    ///
    /// Half-life scans are not refined; a range with `inner_step` is rejected.
    pub fn set_half_life_limit(&mut self, range: &ScanRange) -> Result<LimitOutcome> {
        range.validate("half-life", true)?;
        if range.inner_step.is_some() {
            return Err(Error::InvalidBounds(
                "half-life range does not take an inner_step".to_string(),
            ));
        }
        let axis = ScanAxis::InverseHalfLife;
        let mut rates: Vec<f64> = range.values().into_iter().map(|t| 1.0 / t).collect();
        rates.sort_by(f64::total_cmp);

        self.phase = ScanPhase::Scanning;
        let (points, clamped) = self.scan(axis, &rates)?;
        let curve = ScanCurve::from_points(axis, points);
        self.conclude(curve, clamped)
    }

    /// Effective-mass limit over `range` (eV), with optional refinement at
    /// `range.inner_step` between the two outer points bracketing the first crossing.
    pub fn set_mass_limit(&mut self, range: &ScanRange) -> Result<LimitOutcome> {
        range.validate("mass", false)?;
        let axis = ScanAxis::EffectiveMass;
        let threshold = self.settings.required_delta_chi_squared;

        self.phase = ScanPhase::Scanning;
        let (points, mut clamped) = self.scan(axis, &range.values())?;
        let mut curve = ScanCurve::from_points(axis, points);

        if let Some(inner) = range.inner_step {
            self.phase = ScanPhase::CurveBuilt;
            let coarse = curve.delta();
            match first_crossing(&coarse.points, threshold) {
                Some(k) if k > 0 => {
                    let (a, b) = (coarse.points[k - 1].value, coarse.points[k].value);
                    let tol = RANGE_TOLERANCE * inner.max(b.abs());
                    let fine: Vec<f64> = stepped(a, b, inner)
                        .into_iter()
                        .filter(|v| *v > a + tol && *v < b - tol)
                        .collect();
                    log::debug!(
                        "refining mass crossing in ({}, {}) with {} points",
                        a,
                        b,
                        fine.len()
                    );
                    self.phase = ScanPhase::Scanning;
                    let (extra, extra_clamped) = self.scan(axis, &fine)?;
                    clamped += extra_clamped;
                    curve.merge(extra);
                }
                _ => log::debug!("no bracketed coarse crossing; skipping mass refinement"),
            }
        }

        self.conclude(curve, clamped)
    }

    fn comparison(&self) -> &Spectrum {
        self.data.as_ref().unwrap_or(&self.background)
    }

    fn scan(&mut self, axis: ScanAxis, values: &[f64]) -> Result<(Vec<ScanPoint>, usize)> {
        let total = values.len();
        let livetime = self.settings.livetime;
        log::debug!("scanning {} points on {:?}", total, axis);

        let mut points = Vec::with_capacity(total);
        let mut clamped = 0usize;
        for (i, &value) in values.iter().enumerate() {
            if self.cancel.as_ref().is_some_and(|f| f.load(Ordering::Relaxed)) {
                return Err(Error::Cancelled { completed: i, total });
            }
            let realization = self.source.realize(axis.parameter(value), livetime)?;
            if realization.clamp.is_some() {
                clamped += 1;
            }
            let candidate = self.background.try_add(&realization.spectrum)?;
            let score = sum_log_likelihood(self.comparison(), &candidate)?;
            log::trace!("{:?} {:e}: score {}", axis, value, score);
            points.push(ScanPoint { value, score });
        }
        Ok((points, clamped))
    }

    fn conclude(&mut self, curve: ScanCurve, clamped_points: usize) -> Result<LimitOutcome> {
        let delta_curve = curve.delta();
        self.phase = ScanPhase::CurveBuilt;
        let threshold = self.settings.required_delta_chi_squared;

        let Some(crossing) = delta_curve.first_crossing(threshold) else {
            self.phase = ScanPhase::LimitNotFound;
            let max_delta = delta_curve.max_delta();
            log::info!("no crossing of {} in scanned range (max delta {})", threshold, max_delta);
            return Ok(LimitOutcome::NotFound(NoCrossing {
                threshold,
                max_delta,
                curve,
                delta_curve,
                clamped_points,
            }));
        };

        let parameter = curve.axis.parameter(crossing.value);
        let realization = self.source.realize(parameter, self.settings.livetime)?;
        let candidate = self.background.try_add(&realization.spectrum)?;
        self.phase = ScanPhase::LimitFound;
        log::info!("limit {:?} at delta {} (threshold {})", parameter, crossing.score, threshold);

        Ok(LimitOutcome::Found(LimitResult {
            parameter,
            scan_value: crossing.value,
            delta: crossing.score,
            threshold,
            expected_events: realization.expected_events,
            signal: realization.spectrum,
            candidate,
            curve,
            delta_curve,
            clamped_points,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likelihood::log_likelihood;
    use crate::signal::SignalModel;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use zn_core::Realization;
    use zn_physics::ZeroNuConverter;

    const N_NUCLEI: f64 = 1.6e26;

    fn background() -> Spectrum {
        Spectrum::from_contents("bkg", 2.0, 3.0, vec![100.0; 10]).unwrap()
    }

    fn peak() -> Spectrum {
        let mut s = background().zeroed();
        s.set_label("0vbb");
        for e in [2.45, 2.55, 2.65] {
            s.fill(e, 1.0).unwrap();
        }
        s
    }

    fn model() -> SignalModel<ZeroNuConverter> {
        SignalModel::new(peak(), ZeroNuConverter::new("Te130").unwrap(), N_NUCLEI).unwrap()
    }

    /// Signal that is always empty.
    struct NullSignal(Spectrum);

    impl SignalSource for NullSignal {
        fn realize(&mut self, _parameter: Parameter, _livetime: f64) -> Result<Realization> {
            Ok(Realization { spectrum: self.0.zeroed(), expected_events: 0.0, clamp: None })
        }
    }

    /// Delta on the rate axis for a 3-bin peak over a flat 100-count background.
    fn analytic_score(t_half: f64, livetime: f64) -> f64 {
        let events = std::f64::consts::LN_2 * N_NUCLEI * livetime / t_half;
        3.0 * log_likelihood(100.0, 100.0 + events / 3.0).abs()
    }

    #[test]
    fn test_default_settings() {
        let s = LimitSettings::default();
        assert_eq!(s.required_delta_chi_squared, 2.71);
        assert_eq!(s.livetime, 5.0);
        assert_eq!(s.mass, ScanRange::new(0.0, 0.27, 0.01));
        assert_eq!(s.half_life.hi, 1.0e25);

        let partial: LimitSettings = serde_json::from_str(r#"{"livetime": 2.0}"#).unwrap();
        assert_eq!(partial.livetime, 2.0);
        assert_eq!(partial.required_delta_chi_squared, 2.71);
    }

    #[test]
    fn test_threshold_for_confidence_level() {
        assert_relative_eq!(threshold_for_confidence_level(0.90).unwrap(), 2.705543454095404, max_relative = 1e-4);
        assert!(threshold_for_confidence_level(1.0).is_err());
    }

    #[test]
    fn test_range_values_include_reachable_end() {
        let v = ScanRange::new(0.0, 0.27, 0.01).values();
        assert_eq!(v.len(), 28);
        assert_relative_eq!(*v.last().unwrap(), 0.27, max_relative = 1e-12);

        let v = ScanRange::new(1e23, 1e25, 1e24).values();
        assert_eq!(v.len(), 10);
        assert_relative_eq!(*v.last().unwrap(), 9.1e24, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_bounds() {
        let mut scanner = LimitScanner::new(background(), model(), LimitSettings::default()).unwrap();
        for bad in [
            ScanRange::new(1e25, 1e24, 1e24),
            ScanRange::new(1e24, 1e25, 0.0),
            ScanRange::new(0.0, 1e25, 1e24),
            ScanRange::new(1e24, f64::INFINITY, 1e24),
        ] {
            let err = scanner.set_half_life_limit(&bad).unwrap_err();
            assert!(matches!(err, Error::InvalidBounds(_)), "{:?}", bad);
        }
        let err = scanner.set_mass_limit(&ScanRange::new(0.0, 0.27, 0.01).with_inner_step(0.02)).unwrap_err();
        assert!(matches!(err, Error::InvalidBounds(_)));
        assert_eq!(scanner.phase(), ScanPhase::Initialized);

        let settings = LimitSettings { required_delta_chi_squared: 0.0, ..Default::default() };
        assert!(matches!(LimitScanner::new(background(), model(), settings), Err(Error::InvalidBounds(_))));
    }

    #[test]
    fn test_inner_step_too_fine() {
        let range = ScanRange::new(0.0, 0.27, 0.01).with_inner_step(1e-12);
        assert!(matches!(range.validate("mass", false), Err(Error::InvalidBounds(_))));
        assert!(ScanRange::new(0.0, 0.27, 0.01).with_inner_step(1e-6).validate("mass", false).is_ok());

        let mut scanner = LimitScanner::new(background(), model(), LimitSettings::default()).unwrap();
        let err = scanner.set_mass_limit(&range).unwrap_err();
        assert!(matches!(err, Error::InvalidBounds(_)));
        assert_eq!(scanner.phase(), ScanPhase::Initialized);
    }

    #[test]
    fn test_half_life_rejects_inner_step() {
        let mut scanner = LimitScanner::new(background(), model(), LimitSettings::default()).unwrap();
        let range = ScanRange::new(1e24, 1e25, 1e24).with_inner_step(1e23);
        let err = scanner.set_half_life_limit(&range).unwrap_err();
        assert!(matches!(err, Error::InvalidBounds(_)));
        assert_eq!(scanner.phase(), ScanPhase::Initialized);
    }

    #[test]
    fn test_shape_mismatch_is_propagated() {
        let wide = Spectrum::from_contents("wide", 2.0, 3.0, vec![100.0; 12]).unwrap();
        let mut scanner = LimitScanner::new(wide, model(), LimitSettings::default()).unwrap();
        let err = scanner.set_half_life_limit(&ScanRange::new(1e23, 1e25, 1e24)).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        let other = Spectrum::from_contents("d", 2.0, 3.0, vec![1.0; 12]).unwrap();
        let scanner = LimitScanner::new(background(), model(), LimitSettings::default()).unwrap();
        assert!(scanner.with_data(other).is_err());
    }

    #[test]
    fn test_half_life_scan_crossing_within_one_step() {
        let livetime = 1.0;
        let settings = LimitSettings { livetime, ..Default::default() };
        let mut scanner = LimitScanner::new(background(), model(), settings).unwrap();
        let range = ScanRange::new(1e23, 1e25, 1e24);
        let outcome = scanner.set_half_life_limit(&range).unwrap();
        assert_eq!(scanner.phase(), ScanPhase::LimitFound);

        let result = outcome.limit().unwrap();
        let Parameter::HalfLife(t_found) = result.parameter else {
            panic!("expected a half-life, got {:?}", result.parameter);
        };
        assert!(result.delta >= 2.71);
        assert_eq!(result.clamped_points, 0);
        assert_eq!(result.curve.axis, ScanAxis::InverseHalfLife);

        // Minimum sits at the weakest signal, T½ = 9.1e24.
        let floor = analytic_score(9.1e24, livetime);
        let delta = |t: f64| analytic_score(t, livetime) - floor;
        let (mut lo, mut hi) = (1e23, 9.1e24);
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if delta(mid) >= 2.71 { lo = mid } else { hi = mid }
        }
        let t_star = lo;
        assert!(t_star > 1e24 && t_star < 8e24, "analytic crossing {}", t_star);
        assert!(t_found <= t_star * (1.0 + 1e-9));
        assert!(t_star - t_found < 1e24, "found {} vs analytic {}", t_found, t_star);

        assert_relative_eq!(result.scan_value, 1.0 / t_found, max_relative = 1e-12);
        assert_relative_eq!(result.candidate.integral(), 1000.0 + result.signal.integral(), max_relative = 1e-12);
        assert_relative_eq!(
            result.expected_events,
            std::f64::consts::LN_2 * N_NUCLEI * livetime / t_found,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_mass_scan_null_signal_not_found() {
        let settings = LimitSettings::default();
        let mut scanner = LimitScanner::new(background(), NullSignal(background()), settings).unwrap();
        let outcome = scanner.set_mass_limit(&settings.mass).unwrap();
        assert_eq!(scanner.phase(), ScanPhase::LimitNotFound);
        match outcome {
            LimitOutcome::NotFound(n) => {
                assert_eq!(n.max_delta, 0.0);
                assert_eq!(n.curve.points.len(), 28);
                assert_eq!(n.threshold, 2.71);
            }
            LimitOutcome::Found(r) => panic!("unexpected limit {:?}", r.parameter),
        }
    }

    #[test]
    fn test_mass_scan_doubles_delta_and_refines() {
        let settings = LimitSettings::default();
        let coarse_range = settings.mass;

        let mut coarse = LimitScanner::new(background(), model(), settings).unwrap();
        let coarse_out = coarse.set_mass_limit(&coarse_range).unwrap();
        let coarse_limit = coarse_out.limit().unwrap();
        assert_eq!(coarse_limit.clamped_points, 1);

        let min = coarse_limit.curve.min_score().unwrap();
        for (raw, delta) in coarse_limit.curve.points.iter().zip(&coarse_limit.delta_curve.points) {
            assert_relative_eq!(delta.score, 2.0 * (raw.score - min), max_relative = 1e-12, epsilon = 1e-12);
        }

        let mut fine = LimitScanner::new(background(), model(), settings).unwrap();
        let fine_out = fine.set_mass_limit(&coarse_range.with_inner_step(0.001)).unwrap();
        let fine_limit = fine_out.limit().unwrap();
        let m_coarse = coarse_limit.scan_value;
        let m_fine = fine_limit.scan_value;
        assert_relative_eq!(m_coarse, 0.13, max_relative = 1e-9);
        assert_relative_eq!(m_fine, 0.127, max_relative = 1e-9);
        assert!(fine_limit.curve.points.len() > coarse_limit.curve.points.len());
        assert!(fine_limit.delta >= 2.71);
        assert!(fine_limit.curve.points.windows(2).all(|w| w[0].value < w[1].value));
    }

    #[test]
    fn test_explicit_data_shifts_minimum() {
        // 30-event excess in the peak bins: best fit near T½ = 4.1e24.
        let mut data = background();
        for e in [2.45, 2.55, 2.65] {
            data.fill(e, 10.0).unwrap();
        }
        let mut scanner = LimitScanner::new(background(), model(), LimitSettings::default())
            .unwrap()
            .with_data(data)
            .unwrap();
        let outcome = scanner.set_half_life_limit(&ScanRange::new(1e23, 1e25, 1e24)).unwrap();
        let best = outcome.delta_curve().points.iter().find(|p| p.score == 0.0).unwrap();
        assert_relative_eq!(best.value, 1.0 / 4.1e24, max_relative = 1e-9);
        assert!(outcome.limit().is_some());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut scanner = LimitScanner::new(background(), model(), LimitSettings::default())
            .unwrap()
            .with_cancel_flag(flag.clone());
        let err = scanner.set_mass_limit(&ScanRange::new(0.0, 0.27, 0.01)).unwrap_err();
        assert!(matches!(err, Error::Cancelled { completed: 0, total: 28 }));

        flag.store(false, Ordering::Relaxed);
        assert!(scanner.set_mass_limit(&ScanRange::new(0.0, 0.27, 0.01)).is_ok());
    }

    #[test]
    fn test_first_crossing_monotone() {
        let pts: Vec<ScanPoint> = [0.0, 0.5, 1.9, 2.71, 4.0]
            .iter()
            .enumerate()
            .map(|(i, &d)| ScanPoint { value: i as f64, score: d })
            .collect();
        assert_eq!(first_crossing(&pts, 2.71), Some(3));
        assert_eq!(first_crossing(&pts, 5.0), None);
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let settings = LimitSettings::default();
        let mut scanner = LimitScanner::new(background(), NullSignal(background()), settings).unwrap();
        let outcome = scanner.set_mass_limit(&settings.mass).unwrap();
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["outcome"], "not_found");
        assert_eq!(v["delta_curve"]["axis"], "effective_mass");
    }

    proptest! {
        #[test]
        fn prop_delta_curve_non_negative_with_zero(
            scores in proptest::collection::vec(-1e3f64..1e3, 1..40),
            mass_axis in any::<bool>(),
        ) {
            let axis = if mass_axis { ScanAxis::EffectiveMass } else { ScanAxis::InverseHalfLife };
            let points = scores.iter().enumerate().map(|(i, &s)| ScanPoint { value: i as f64, score: s }).collect();
            let delta = ScanCurve::from_points(axis, points).delta();
            prop_assert!(delta.points.iter().all(|p| p.score >= 0.0));
            prop_assert!(delta.points.iter().any(|p| p.score == 0.0));
        }

        #[test]
        fn prop_first_crossing_on_monotone_curve(
            mut deltas in proptest::collection::vec(0.0f64..10.0, 1..40),
            threshold in 0.1f64..12.0,
        ) {
            deltas.sort_by(f64::total_cmp);
            let curve = DeltaCurve {
                axis: ScanAxis::EffectiveMass,
                points: deltas.iter().enumerate().map(|(i, &d)| ScanPoint { value: i as f64, score: d }).collect(),
            };
            match curve.first_crossing(threshold) {
                Some(p) => {
                    prop_assert!(p.score >= threshold);
                    let i = p.value as usize;
                    prop_assert!(deltas[..i].iter().all(|&d| d < threshold));
                }
                None => prop_assert!(deltas.iter().all(|&d| d < threshold)),
            }
        }
    }
}
