//! # zn-physics
//!
//! Double-beta decay physics used by the limit scanner: isotope constants,
//! the 2νββ-anchored validity range, half-life ↔ effective-mass conversion,
//! expected decay counts and detector target helpers.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Physical constants and per-isotope nuclear data.
pub mod constants;
/// Half-life ↔ effective-mass converter.
pub mod converter;
/// Expected decay-count formulas.
pub mod decays;
/// 2νββ decay and half-life bounds.
pub mod double_beta;
/// Target isotope with a number of nuclei.
pub mod isotope;
/// Regions of interest.
pub mod roi;
/// Loaded-scintillator target masses.
pub mod target;
/// Duration parsing.
pub mod units;

pub use constants::{isotope, isotope_names, IsotopeData};
pub use converter::ZeroNuConverter;
pub use double_beta::DoubleBeta;
pub use isotope::{number_nuclei_for_mass, ExpectedDecays, Isotope};
pub use roi::Roi;
pub use target::LoadedScintillator;
pub use units::parse_duration_years;
