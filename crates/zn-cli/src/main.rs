//! zeronu CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use zn_core::{NuclearConverter, Parameter};
use zn_inference::{toys, LimitOutcome, LimitScanner};
use zn_physics::{parse_duration_years, Isotope, ZeroNuConverter};

mod config;

use config::ScanKind;

#[derive(Parser)]
#[command(name = "zeronu")]
#[command(about = "zeronu - 0νββ sensitivity limits from delta log-likelihood scans")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Half-life or effective-mass limit from an analysis config
    Limit {
        /// Analysis config (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compare against a Poisson-fluctuated background drawn with this seed.
        #[arg(long)]
        toy_seed: Option<u64>,
    },

    /// Convert a 0νββ half-life to an effective mass or back
    Convert {
        /// Isotope name (Te130, Xe136, Nd150)
        #[arg(long, default_value = "Te130")]
        isotope: String,

        /// Half-life in years
        #[arg(long, conflicts_with = "mass", required_unless_present = "mass")]
        half_life: Option<f64>,

        /// Effective mass in eV
        #[arg(long)]
        mass: Option<f64>,
    },

    /// Expected 0νββ decays for a target and livetime
    Decays {
        /// Isotope name (Te130, Xe136, Nd150)
        #[arg(long, default_value = "Te130")]
        isotope: String,

        /// Number of target nuclei
        #[arg(long, conflicts_with = "target_mass", required_unless_present = "target_mass")]
        number_nuclei: Option<f64>,

        /// Isotope mass in kg
        #[arg(long)]
        target_mass: Option<f64>,

        /// Livetime, e.g. "5 y" or "112.3 d"
        #[arg(long, default_value = "1 y")]
        livetime: String,

        /// Half-life in years
        #[arg(long, conflicts_with = "mass", required_unless_present = "mass")]
        half_life: Option<f64>,

        /// Effective mass in eV
        #[arg(long)]
        mass: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Limit { config, output, toy_seed } => {
            cmd_limit(&config, output.as_ref(), toy_seed)
        }
        Commands::Convert { isotope, half_life, mass } => {
            cmd_convert(&isotope, parameter(half_life, mass)?)
        }
        Commands::Decays { isotope, number_nuclei, target_mass, livetime, half_life, mass } => {
            cmd_decays(&isotope, number_nuclei, target_mass, &livetime, parameter(half_life, mass)?)
        }
    }
}

fn parameter(half_life: Option<f64>, mass: Option<f64>) -> Result<Parameter> {
    match (half_life, mass) {
        (Some(t), None) => Ok(Parameter::HalfLife(t)),
        (None, Some(m)) => Ok(Parameter::EffectiveMass(m)),
        _ => anyhow::bail!("give exactly one of --half-life or --mass"),
    }
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

/// Both representations of a signal strength.
fn equivalents(converter: &ZeroNuConverter, parameter: Parameter) -> (f64, f64) {
    match parameter {
        Parameter::HalfLife(t) => (t, converter.half_life_to_mass(t)),
        Parameter::EffectiveMass(m) => (converter.mass_to_half_life(m), m),
    }
}

fn cmd_limit(config_path: &PathBuf, output: Option<&PathBuf>, toy_seed: Option<u64>) -> Result<()> {
    let cfg = config::read_analysis_config(config_path)?;
    let settings = cfg.settings()?;
    let isotope = cfg.isotope()?;
    let (background, components) = cfg.background(&isotope, settings.livetime)?;
    let model = cfg.signal_model(&isotope)?;

    tracing::info!(
        isotope = isotope.name(),
        number_nuclei = isotope.number_nuclei(),
        livetime = settings.livetime,
        background_events = background.integral(),
        "limit setup"
    );

    let data = match (toy_seed, cfg.data()?) {
        (Some(_), Some(_)) => {
            anyhow::bail!("--toy-seed cannot be combined with a config 'data' spectrum")
        }
        (Some(seed), None) => Some(toys::poisson_fluctuate(&background, seed)?),
        (None, data) => data,
    };

    let mut scanner = LimitScanner::new(background.clone(), model, settings)?;
    if let Some(d) = data {
        scanner = scanner.with_data(d)?;
    }

    let scan = cfg.config.scan;
    let outcome = match scan {
        ScanKind::HalfLife => scanner.set_half_life_limit(&settings.half_life)?,
        ScanKind::Mass => scanner.set_mass_limit(&settings.mass)?,
    };

    let mut report = serde_json::json!({
        "tool": "zeronu",
        "isotope": isotope.name(),
        "scan": match scan { ScanKind::HalfLife => "half_life", ScanKind::Mass => "mass" },
        "number_nuclei": isotope.number_nuclei(),
        "livetime": settings.livetime,
        "settings": settings,
        "background": {
            "integral": background.integral(),
            "components": components,
        },
        "toy_seed": toy_seed,
    });

    match &outcome {
        LimitOutcome::Found(limit) => {
            let (t_half, mass) = equivalents(isotope.converter(), limit.parameter);
            tracing::info!(t_half, mass, delta = limit.delta, "limit found");
            report["half_life"] = serde_json::json!(t_half);
            report["effective_mass"] = serde_json::json!(mass);
        }
        LimitOutcome::NotFound(n) => {
            tracing::warn!(
                max_delta = n.max_delta,
                threshold = n.threshold,
                "no crossing in scanned range"
            );
        }
    }

    if let (Some(obj), serde_json::Value::Object(extra)) =
        (report.as_object_mut(), serde_json::to_value(&outcome)?)
    {
        obj.extend(extra);
    }

    write_json(output, report)
}

fn cmd_convert(isotope: &str, parameter: Parameter) -> Result<()> {
    let converter = ZeroNuConverter::new(isotope)?;
    let (t_half, mass) = equivalents(&converter, parameter);
    let clamped = match parameter {
        Parameter::HalfLife(t) => converter.clamp_half_life(t).was_clamped(),
        Parameter::EffectiveMass(m) => converter.clamp_mass(m).was_clamped(),
    };

    write_json(
        None,
        serde_json::json!({
            "isotope": converter.isotope(),
            "input": parameter,
            "half_life": t_half,
            "effective_mass": mass,
            "clamped": clamped,
            "conversion_factor": converter.conversion_factor(),
            "t_half_bounds": converter.t_half_bounds(),
            "mass_bounds": converter.mass_bounds(),
        }),
    )
}

fn cmd_decays(
    isotope: &str,
    number_nuclei: Option<f64>,
    target_mass: Option<f64>,
    livetime: &str,
    parameter: Parameter,
) -> Result<()> {
    let target = match (number_nuclei, target_mass) {
        (Some(n), None) => Isotope::with_number_nuclei(isotope, n)?,
        (None, Some(kg)) => Isotope::with_target_mass(isotope, kg)?,
        _ => anyhow::bail!("give exactly one of --number-nuclei or --target-mass"),
    };
    let livetime = parse_duration_years(livetime)?;
    let decays = match parameter {
        Parameter::HalfLife(t) => target.decays_from_half_life(t, livetime),
        Parameter::EffectiveMass(m) => target.decays_from_mass(m, livetime),
    };

    write_json(
        None,
        serde_json::json!({
            "isotope": target.name(),
            "number_nuclei": target.number_nuclei(),
            "livetime": livetime,
            "input": parameter,
            "events": decays.events,
            "used": decays.used.value,
            "clamped": decays.used.was_clamped(),
        }),
    )
}
