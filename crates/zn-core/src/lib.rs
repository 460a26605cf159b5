//! # zn-core
//!
//! Core types shared by the zeronu crates: the [`Spectrum`] value type,
//! signal-strength [`Parameter`]s, the [`Error`] type and the collaborator
//! traits ([`NuclearConverter`], [`SignalSource`]) the limit scanner is
//! written against.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error type and `Result` alias.
pub mod error;
/// Fixed-binning energy spectrum.
pub mod spectrum;
/// Collaborator traits.
pub mod traits;
/// Parameters, clamping and energy ranges.
pub mod types;

pub use error::{Error, Result};
pub use spectrum::Spectrum;
pub use traits::{NuclearConverter, Realization, SignalSource};
pub use types::{Bound, Clamped, EnergyRange, Parameter};
