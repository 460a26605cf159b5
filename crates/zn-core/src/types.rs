//! Common data types for zeronu

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Signal strength, either as a 0νββ half-life or as an effective Majorana mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Parameter {
    /// Half-life in years.
    HalfLife(f64),
    /// Effective mass `m_ββ` in eV.
    EffectiveMass(f64),
}

impl Parameter {
    /// Raw numeric value (years or eV).
    pub fn value(&self) -> f64 {
        match *self {
            Parameter::HalfLife(v) | Parameter::EffectiveMass(v) => v,
        }
    }

    /// Same kind, different value.
    pub fn with_value(&self, value: f64) -> Self {
        match self {
            Parameter::HalfLife(_) => Parameter::HalfLife(value),
            Parameter::EffectiveMass(_) => Parameter::EffectiveMass(value),
        }
    }
}

/// Which end of a validity range a value was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Clamped up to the minimum.
    Lower,
    /// Clamped down to the maximum.
    Upper,
}

/// A value forced into a closed validity range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clamped {
    /// Value as requested by the caller.
    pub requested: f64,
    /// Value actually used.
    pub value: f64,
    /// Bound that was applied, if any.
    pub bound: Option<Bound>,
}

impl Clamped {
    /// Clamp `requested` into `[min, max]`.
    pub fn within(requested: f64, (min, max): (f64, f64)) -> Self {
        if requested < min {
            Self { requested, value: min, bound: Some(Bound::Lower) }
        } else if requested > max {
            Self { requested, value: max, bound: Some(Bound::Upper) }
        } else {
            Self { requested, value: requested, bound: None }
        }
    }

    /// True if the requested value was outside the range.
    pub fn was_clamped(&self) -> bool {
        self.bound.is_some()
    }
}

/// Energy sub-range `[lo, hi]` in MeV, e.g. a region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyRange {
    /// Lower edge (MeV).
    pub lo: f64,
    /// Upper edge (MeV).
    pub hi: f64,
}

impl EnergyRange {
    /// Validated constructor.
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(Error::Validation(format!(
                "energy range must satisfy lo < hi, got [{}, {}]",
                lo, hi
            )));
        }
        Ok(Self { lo, hi })
    }

    /// Width of the range.
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}
