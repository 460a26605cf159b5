//! Signal spectra scaled to a half-life or effective mass.

use zn_core::{
    Clamped, EnergyRange, Error, NuclearConverter, Parameter, Realization, Result, SignalSource,
    Spectrum,
};
use zn_physics::converter::warn_clamped;
use zn_physics::decays;

/// A 0νββ signal shape with a fixed target size.
///
/// The unscaled template is kept untouched; every scaling goes through an
/// owned scratch copy, which is reset from the template when it can no
/// longer be rescaled.
#[derive(Debug, Clone)]
pub struct SignalModel<C: NuclearConverter> {
    template: Spectrum,
    scratch: Spectrum,
    converter: C,
    number_nuclei: f64,
    roi: Option<EnergyRange>,
}

impl<C: NuclearConverter> SignalModel<C> {
    /// Signal with shape `template` for a target of `number_nuclei` nuclei.
    pub fn new(template: Spectrum, converter: C, number_nuclei: f64) -> Result<Self> {
        if !number_nuclei.is_finite() || number_nuclei <= 0.0 {
            return Err(Error::Validation(format!(
                "number of nuclei must be finite and > 0, got {}",
                number_nuclei
            )));
        }
        Ok(Self { scratch: template.clone(), template, converter, number_nuclei, roi: None })
    }

    /// Scale the expected events into `roi` instead of the whole spectrum.
    pub fn with_roi(mut self, roi: EnergyRange) -> Self {
        self.roi = Some(roi);
        self
    }

    /// Unscaled signal shape.
    pub fn template(&self) -> &Spectrum {
        &self.template
    }

    /// Half-life ↔ mass converter.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Number of target nuclei.
    pub fn number_nuclei(&self) -> f64 {
        self.number_nuclei
    }

    /// Region the event count refers to, if any.
    pub fn roi(&self) -> Option<EnergyRange> {
        self.roi
    }

    /// Expected events for `parameter` over `livetime` years, after clamping
    /// the parameter into the converter's valid range.
    pub fn expected_events(&self, parameter: Parameter, livetime: f64) -> (f64, Clamped) {
        match parameter {
            Parameter::HalfLife(t_half) => {
                let used = self.converter.clamp_half_life(t_half);
                warn_clamped("half-life", "y", &used);
                (decays::decays_from_half_life(used.value, self.number_nuclei, livetime), used)
            }
            Parameter::EffectiveMass(mass) => {
                let used = self.converter.clamp_mass(mass);
                warn_clamped("effective mass", "eV", &used);
                let events = decays::decays_from_mass(
                    used.value,
                    self.number_nuclei,
                    livetime,
                    self.converter.conversion_factor(),
                );
                (events, used)
            }
        }
    }

    /// Signal spectrum holding the expected events for `parameter` and `livetime`.
    ///
    /// Repeating a call with the same arguments yields the same spectrum.
    pub fn scale_to(&mut self, parameter: Parameter, livetime: f64) -> Result<Spectrum> {
        Ok(self.scale(parameter, livetime)?.spectrum)
    }

    fn scale(&mut self, parameter: Parameter, livetime: f64) -> Result<Realization> {
        if !livetime.is_finite() || livetime <= 0.0 {
            return Err(Error::Validation(format!("livetime must be > 0 years, got {}", livetime)));
        }
        let (events, used) = self.expected_events(parameter, livetime);
        let roi = self.roi;

        match self.scratch.scale_to(events, roi.as_ref()) {
            Ok(()) => {}
            Err(Error::DegenerateSpectrum(msg)) => {
                log::debug!("signal scratch degenerate ({}); resetting from template", msg);
                self.scratch = self.template.clone();
                if let Err(e) = self.scratch.scale_to(events, roi.as_ref()) {
                    log::warn!(
                        "cannot scale signal '{}' to {:e} events: {}",
                        self.template.label(),
                        events,
                        e
                    );
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }

        Ok(Realization {
            spectrum: self.scratch.clone(),
            expected_events: events,
            clamp: used.was_clamped().then_some(used),
        })
    }
}

impl<C: NuclearConverter> SignalSource for SignalModel<C> {
    fn realize(&mut self, parameter: Parameter, livetime: f64) -> Result<Realization> {
        self.scale(parameter, livetime)
    }
}
