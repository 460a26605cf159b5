//! # zn-inference
//!
//! Sensitivity limits for zeronu.
//!
//! This crate provides:
//! - the binned Poisson log-likelihood scorer
//! - `SignalModel`, a signal template scaled to a half-life or effective mass
//! - `LimitScanner`, the delta log-likelihood scan over half-life or mass
//! - Asimov and Poisson pseudo-data
//!
//! ## Architecture
//!
//! The scanner depends on the `SignalSource` trait from zn-core, not on
//! `SignalModel`; any source of scaled signal spectra can be scanned.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Delta log-likelihood limit scans.
pub mod limit;
/// Binned log-likelihood scorer.
pub mod likelihood;
/// Signal spectra scaled to a signal strength.
pub mod signal;
/// Asimov and Poisson pseudo-data.
pub mod toys;

pub use limit::{
    first_crossing, threshold_for_confidence_level, DeltaCurve, LimitOutcome, LimitResult,
    LimitScanner, LimitSettings, NoCrossing, ScanAxis, ScanCurve, ScanPhase, ScanPoint, ScanRange,
};
pub use likelihood::{log_likelihood, sum_delta_log_likelihood, sum_log_likelihood};
pub use signal::SignalModel;
