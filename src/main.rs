//! # wavefit
//!
//! Command-line front end: fit a sinusoidal model to a JSON sample file, or
//! run the walk-forward forecaster over it.

use std::error::Error as _;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};
use tracing_subscriber::EnvFilter;

use wavefit::config::{AppConfig, FitConfig, FollowConfig};
use wavefit::error::{Error, Result};
use wavefit::harmonic::{Base, Forecaster, Sample};
use wavefit::io;

#[derive(Parser)]
#[command(name = "wavefit", version)]
#[command(about = "Fit sums of cosines to a signal and forecast it", long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit one model to the whole sample file
    Fit {
        /// Input JSON sample file
        #[arg(short, long)]
        input: PathBuf,

        /// Expectation TSV (index, observed, fitted); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the fitted model summary as JSON
        #[arg(long)]
        model: Option<PathBuf>,

        /// Comma-separated cycle lengths to search
        #[arg(long, value_delimiter = ',')]
        wavelengths: Vec<f64>,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Refit a model on a trailing window at every position and forecast ahead
    Follow {
        /// Input JSON sample file
        #[arg(short, long)]
        input: PathBuf,

        /// Forecast TSV (position, observed, predicted); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comma-separated cycle lengths; generated per window when omitted
        #[arg(long, value_delimiter = ',')]
        wavelengths: Vec<f64>,

        /// Comma-separated sample indices excluded from every window fit
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        ignore: Vec<f64>,

        /// First position that gets a prediction
        #[arg(long)]
        start_from: Option<usize>,

        /// How many positions ahead each window predicts
        #[arg(long)]
        gap: Option<usize>,

        /// Window length
        #[arg(long)]
        tail: Option<usize>,

        /// Positions to extrapolate past the end of the data
        #[arg(long)]
        further: Option<usize>,

        /// Fit the windows in parallel
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Grid lines per axis in each search iteration
    #[arg(long)]
    max_slit: Option<usize>,

    /// Number of narrowing iterations
    #[arg(long)]
    step: Option<usize>,

    /// Drop components whose amplitude is at or below this value
    #[arg(long, allow_hyphen_values = true)]
    dropout: Option<f64>,
}

impl SearchArgs {
    fn apply(&self, max_slit: &mut usize, step: &mut usize, dropout: &mut f64) {
        if let Some(value) = self.max_slit {
            *max_slit = value;
        }
        if let Some(value) = self.step {
            *step = value;
        }
        if let Some(value) = self.dropout {
            *dropout = value;
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            let mut source = err.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Fit {
            input,
            output,
            model,
            wavelengths,
            search,
        } => {
            let mut fit = config.fit;
            if !wavelengths.is_empty() {
                fit.wavelengths = wavelengths;
            }
            search.apply(&mut fit.max_slit, &mut fit.step, &mut fit.dropout);
            run_fit(&input, output.as_deref(), model.as_deref(), &fit)
        }
        Commands::Follow {
            input,
            output,
            wavelengths,
            ignore,
            start_from,
            gap,
            tail,
            further,
            parallel,
            search,
        } => {
            let mut follow = config.follow;
            if !wavelengths.is_empty() {
                follow.wavelengths = wavelengths;
            }
            if !ignore.is_empty() {
                follow.ignorable = ignore;
            }
            follow.start_from = start_from.unwrap_or(follow.start_from);
            follow.gap = gap.unwrap_or(follow.gap);
            follow.tail = tail.unwrap_or(follow.tail);
            follow.further = further.unwrap_or(follow.further);
            search.apply(&mut follow.max_slit, &mut follow.step, &mut follow.dropout);
            run_follow(&input, output.as_deref(), follow, parallel)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::discover()?.unwrap_or_default()),
    }
}

fn load_samples(input: &Path) -> Result<Vec<Sample>> {
    let samples = io::read_samples(input)?;
    if samples.is_empty() {
        return Err(Error::EmptyData(format!(
            "{} contains no samples",
            input.display()
        )));
    }
    info!("read {} samples from {}", samples.len(), input.display());
    Ok(samples)
}

fn run_fit(input: &Path, output: Option<&Path>, model: Option<&Path>, fit: &FitConfig) -> Result<()> {
    let samples = load_samples(input)?;

    let mut base = Base::from_wavelengths(&fit.wavelengths)?;
    base.fit_with(&samples, fit)?;

    info!("retained wavelengths: {:?}", base.wavelengths());
    info!(
        "offset {:.6}, {} components, mse {:.6e}",
        base.offset(),
        base.len(),
        base.calc_mse(&samples)
    );

    match output {
        Some(path) => {
            io::write_expectation(&samples, &base, path)?;
            info!("wrote expectation to {}", path.display());
        }
        None => io::tsv::write_expectation_to(&samples, &base, stdout().lock())?,
    }

    if let Some(path) = model {
        io::write_model(&base, path)?;
        info!("wrote model summary to {}", path.display());
    }
    Ok(())
}

fn run_follow(input: &Path, output: Option<&Path>, follow: FollowConfig, parallel: bool) -> Result<()> {
    let samples = load_samples(input)?;

    let forecaster = Forecaster::new(follow)?;
    debug!("follow settings: {:?}", forecaster.config());
    let predictions = if parallel {
        forecaster.follow_parallel(&samples)?
    } else {
        forecaster.follow(&samples)?
    };

    match output {
        Some(path) => {
            io::write_forecast(&samples, &predictions, path)?;
            info!("wrote {} predictions to {}", predictions.len(), path.display());
        }
        None => io::tsv::write_forecast_to(&samples, &predictions, stdout().lock())?,
    }
    Ok(())
}
