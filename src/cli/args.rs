use crate::error::Result;
use crate::settings::{AmbiguityPolicy, ConverterConfig, FailurePolicy, NumberFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helioclim-converter")]
#[command(about = "Convert HelioClim solar irradiation exports into per-year time series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write <place>_<year>.txt for every configured place and year
    Convert {
        #[command(flatten)]
        options: RunOptions,

        #[arg(short, long, help = "Directory for output files [default: .]")]
        output_dir: Option<PathBuf>,

        #[arg(long, value_enum, help = "Number format for output values")]
        format: Option<NumberFormat>,

        #[arg(long, help = "Digits after the decimal point")]
        precision: Option<usize>,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// Report rows per year for each place without writing files
    Inspect {
        #[command(flatten)]
        options: RunOptions,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
}

/// Options shared by every subcommand; each one overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    #[arg(short, long, help = "Configuration file (TOML, JSON or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Directory containing the CSV exports [default: .]")]
    pub input_dir: Option<PathBuf>,

    #[arg(short = 'p', long = "place", help = "Place to convert (repeatable)")]
    pub places: Vec<String>,

    #[arg(short = 'y', long = "year", help = "Year to extract (repeatable)")]
    pub years: Vec<i32>,

    #[arg(long, help = "Use the first matching export when several match a place")]
    pub allow_ambiguous: bool,

    #[arg(long, help = "Continue with remaining places after a failure")]
    pub keep_going: bool,

    #[arg(long, help = "Places to process in parallel, 0 for one per CPU [default: 1]")]
    pub max_workers: Option<usize>,
}

impl RunOptions {
    /// Layer these options over the file and environment configuration.
    pub fn load_config(&self) -> Result<ConverterConfig> {
        let mut config = ConverterConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut ConverterConfig) {
        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if !self.places.is_empty() {
            config.places = self.places.clone();
        }
        if !self.years.is_empty() {
            config.years = self.years.clone();
        }
        if self.allow_ambiguous {
            config.on_ambiguous = AmbiguityPolicy::First;
        }
        if self.keep_going {
            config.on_failure = FailurePolicy::Continue;
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = if workers == 0 {
                num_cpus::get()
            } else {
                workers
            };
        }
    }
}
