//! Analysis config (YAML or JSON) for `zeronu limit`.
//!
//! A single file names the isotope and target, the signal template, the
//! background components and how each is normalised, and the scan to run.
//! Spectrum paths are resolved relative to the config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use zn_core::{EnergyRange, Spectrum};
use zn_inference::{threshold_for_confidence_level, LimitSettings, ScanRange, SignalModel};
use zn_physics::{decays, parse_duration_years, Isotope, LoadedScintillator, Roi, ZeroNuConverter};

/// Which limit to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    HalfLife,
    Mass,
}

/// Livetime as a number of years or a duration string (`"112.3 d"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Livetime {
    Years(f64),
    Text(String),
}

impl Livetime {
    pub fn years(&self) -> Result<f64> {
        match self {
            Livetime::Years(y) => Ok(*y),
            Livetime::Text(s) => Ok(parse_duration_years(s)?),
        }
    }
}

/// Target size: explicit nuclei, isotope mass, or a loaded scintillator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetConfig {
    NumberNuclei(f64),
    MassKg(f64),
    Scintillator(LoadedScintillator),
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig::Scintillator(LoadedScintillator::default())
    }
}

/// Named ROI from the table, or explicit edges in MeV.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoiConfig {
    Named(String),
    Range { lo: f64, hi: f64 },
}

impl RoiConfig {
    pub fn resolve(&self) -> Result<EnergyRange> {
        match self {
            RoiConfig::Named(name) => Ok(Roi::named(name)?.range()),
            RoiConfig::Range { lo, hi } => Ok(EnergyRange::new(*lo, *hi)?),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    pub spectrum: PathBuf,
    /// Scale the signal into the analysis ROI instead of the whole spectrum.
    #[serde(default)]
    pub scale_in_roi: bool,
}

/// One background component; exactly one normalisation must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundComponent {
    pub name: String,
    pub spectrum: PathBuf,
    /// Total events over the livetime.
    #[serde(default)]
    pub events: Option<f64>,
    /// Events inside the analysis ROI over the livetime.
    #[serde(default)]
    pub events_in_roi: Option<f64>,
    /// Half-life (years) of a decay of the target isotope, e.g. 2νββ.
    #[serde(default)]
    pub half_life: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub isotope: String,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub livetime: Option<Livetime>,
    #[serde(default)]
    pub required_delta_chi_squared: Option<f64>,
    #[serde(default)]
    pub confidence_level: Option<f64>,
    pub scan: ScanKind,
    #[serde(default)]
    pub half_life: Option<ScanRange>,
    #[serde(default)]
    pub mass: Option<ScanRange>,
    #[serde(default)]
    pub roi: Option<RoiConfig>,
    pub signal: SignalConfig,
    pub background: Vec<BackgroundComponent>,
    /// Observed spectrum to compare against; defaults to the background.
    #[serde(default)]
    pub data: Option<PathBuf>,
}

/// Config with every path made absolute.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    pub base_dir: PathBuf,
}

pub fn read_analysis_config(path: &Path) -> Result<LoadedConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let config: AnalysisConfig = if ext == "json" {
        serde_json::from_slice(&bytes)?
    } else {
        serde_yaml_ng::from_slice(&bytes)?
    };
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(LoadedConfig { config, base_dir })
}

pub fn read_spectrum(path: &Path) -> Result<Spectrum> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading spectrum {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let spectrum = if ext == "json" {
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_yaml_ng::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(spectrum)
}

/// A background component after normalisation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScaledComponent {
    pub name: String,
    pub events: f64,
}

impl LoadedConfig {
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    pub fn settings(&self) -> Result<LimitSettings> {
        let c = &self.config;
        let mut s = LimitSettings::default();
        if let Some(lt) = &c.livetime {
            s.livetime = lt.years()?;
        }
        s.required_delta_chi_squared = match (c.required_delta_chi_squared, c.confidence_level) {
            (Some(_), Some(_)) => {
                anyhow::bail!(
                    "give either required_delta_chi_squared or confidence_level, not both"
                )
            }
            (Some(t), None) => t,
            (None, Some(cl)) => threshold_for_confidence_level(cl)?,
            (None, None) => s.required_delta_chi_squared,
        };
        if let Some(r) = c.half_life {
            s.half_life = r;
        }
        if let Some(r) = c.mass {
            s.mass = r;
        }
        Ok(s)
    }

    pub fn roi(&self) -> Result<Option<EnergyRange>> {
        self.config.roi.as_ref().map(RoiConfig::resolve).transpose()
    }

    pub fn isotope(&self) -> Result<Isotope> {
        let name = &self.config.isotope;
        let isotope = match &self.config.target {
            TargetConfig::NumberNuclei(n) => Isotope::with_number_nuclei(name, *n)?,
            TargetConfig::MassKg(kg) => Isotope::with_target_mass(name, *kg)?,
            TargetConfig::Scintillator(s) => Isotope::with_target_mass(name, s.target_mass()?)?,
        };
        Ok(isotope)
    }

    pub fn signal_model(&self, isotope: &Isotope) -> Result<SignalModel<ZeroNuConverter>> {
        let template = read_spectrum(&self.resolve(&self.config.signal.spectrum))?;
        let model =
            SignalModel::new(template, isotope.converter().clone(), isotope.number_nuclei())?;
        if self.config.signal.scale_in_roi {
            let roi = self.roi()?.context("signal.scale_in_roi requires an roi")?;
            return Ok(model.with_roi(roi));
        }
        Ok(model)
    }

    /// Sum of the background components, each scaled to its expected events.
    pub fn background(
        &self,
        isotope: &Isotope,
        livetime: f64,
    ) -> Result<(Spectrum, Vec<ScaledComponent>)> {
        let roi = self.roi()?;
        let mut total: Option<Spectrum> = None;
        let mut scaled = Vec::with_capacity(self.config.background.len());

        for comp in &self.config.background {
            let mut spectrum = read_spectrum(&self.resolve(&comp.spectrum))?;
            spectrum.set_label(comp.name.as_str());
            let (events, range) = match (comp.events, comp.events_in_roi, comp.half_life) {
                (Some(n), None, None) => (n, None),
                (None, Some(n), None) => {
                    let r = roi
                        .with_context(|| format!("{}: events_in_roi requires an roi", comp.name))?;
                    (n, Some(r))
                }
                (None, None, Some(t)) => {
                    (decays::decays_from_half_life(t, isotope.number_nuclei(), livetime), None)
                }
                _ => anyhow::bail!(
                    "background '{}' needs exactly one of events, events_in_roi, half_life",
                    comp.name
                ),
            };
            spectrum
                .scale_to(events, range.as_ref())
                .with_context(|| format!("scaling background '{}'", comp.name))?;
            tracing::debug!(component = %comp.name, events, "background component scaled");
            scaled.push(ScaledComponent { name: comp.name.clone(), events });

            total = Some(match total {
                None => spectrum,
                Some(acc) => acc.try_add(&spectrum)?,
            });
        }

        let mut total = total.context("at least one background component is required")?;
        total.set_label("background");
        Ok((total, scaled))
    }

    pub fn data(&self) -> Result<Option<Spectrum>> {
        self.config.data.as_ref().map(|p| read_spectrum(&self.resolve(p))).transpose()
    }
}
