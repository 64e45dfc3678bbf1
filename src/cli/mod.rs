use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use fracwatch::settings::DetectionSettings;

mod config;
mod detect;
mod info;
mod predict;

pub use config::Config;

/// fracwatch - Breakdown Analysis for Well Treatment Telemetry
#[derive(Parser)]
#[command(name = "fracwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Detection settings shared by the analysis subcommands. Flags override the
/// config file, which overrides the built-in defaults.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum spacing between detected breakdowns, seconds
    #[arg(long, value_name = "SECS")]
    min_duration: Option<f64>,

    /// Minimum relative permeability increase to trigger (0.01 = 1%)
    #[arg(long, value_name = "RATIO")]
    k_ratio: Option<f64>,

    /// Fraction of the series trimmed as startup/shutdown transients
    #[arg(long, value_name = "FRACTION")]
    skip_proportion: Option<f64>,

    /// Minimum slurry rate to consider, bbl/min
    #[arg(long, value_name = "RATE")]
    min_rate: Option<f64>,

    /// Filtration radius, m
    #[arg(long, value_name = "METERS")]
    filtration_radius: Option<f64>,

    /// Reservoir pressure, psi
    #[arg(long, value_name = "PSI")]
    reservoir_pressure: Option<f64>,

    /// Fluid viscosity, cP
    #[arg(long, value_name = "CP")]
    viscosity: Option<f64>,
}

impl SettingsArgs {
    /// Resolve defaults, config file, and flag overrides into settings.
    pub fn resolve(&self) -> Result<DetectionSettings> {
        let mut settings = match &self.config {
            Some(path) => Config::from_file(path)?.detection.apply(DetectionSettings::default()),
            None => DetectionSettings::default(),
        };

        if let Some(v) = self.min_duration {
            settings.min_breakdown_duration_secs = v;
        }
        if let Some(v) = self.k_ratio {
            settings.min_k_increase_ratio = v;
        }
        if let Some(v) = self.skip_proportion {
            settings.data_skip_proportion = v;
        }
        if let Some(v) = self.min_rate {
            settings.min_rate_threshold = v;
        }
        if let Some(v) = self.filtration_radius {
            settings.filtration_radius = v;
        }
        if let Some(v) = self.reservoir_pressure {
            settings.reservoir_pressure = v;
        }
        if let Some(v) = self.viscosity {
            settings.fluid_viscosity = v;
        }

        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect breakdown moments in one telemetry export
    Detect {
        /// Input telemetry file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Emit detected timestamps as JSON
        #[arg(long)]
        json: bool,
    },

    /// Learn favorable conditions from historical runs and predict on a new one
    Predict {
        /// Telemetry file to predict breakdowns in
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Directory of historical treatment exports to learn from
        #[arg(short = 't', long, value_name = "DIR")]
        train_dir: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Emit the learned signature and predictions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display information about a telemetry export
    Info {
        /// Input telemetry file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Detect {
            input,
            settings,
            json,
        } => detect::run(input, &settings, json),
        Commands::Predict {
            target,
            train_dir,
            settings,
            json,
        } => predict::run(target, train_dir, &settings, json),
        Commands::Info { file } => info::run(file),
    }
}

/// Section heading for terminal output.
#[cfg(feature = "colorized_output")]
pub(crate) fn heading(text: &str) -> String {
    console::style(text).bold().cyan().to_string()
}

/// Section heading for terminal output.
#[cfg(not(feature = "colorized_output"))]
pub(crate) fn heading(text: &str) -> String {
    text.to_string()
}
