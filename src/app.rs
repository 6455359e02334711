//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads observations and runs the fit
//! - prints reports/plots
//! - generates synthetic samples

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;

use crate::cli::{Cli, Command, FitArgs, SampleArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{FitOptions, ModelKind, ModelSpec};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mptfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    // A logger may already be installed when embedded.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let model = args.model.to_kind(args.terms);
    let options = fit_options_from_args(&args);
    let run = pipeline::run_fit(&args.input, model, &options)?;

    if args.json {
        println!("{}", crate::report::format_fit_json(&run.result)?);
        return Ok(());
    }

    if !run.ingest.row_errors.is_empty() {
        println!(
            "Skipped {} of {} rows (run with --verbose for details).\n",
            run.ingest.row_errors.len(),
            run.ingest.rows_read
        );
    }
    println!("{}", crate::report::format_fit_summary(&run.result));
    if args.table {
        println!("{}", crate::report::format_fitted_table(&run.result));
    }
    if args.plot {
        println!("{}", crate::plot::render_ascii_plot(&run.result, args.width, args.height));
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args)?;
    let sample = generate_sample(&config)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
            crate::io::export::write_observations_csv(BufWriter::new(file), &sample.observations)
        }
        None => crate::io::export::write_observations_csv(std::io::stdout().lock(), &sample.observations),
    }
}

pub fn fit_options_from_args(args: &FitArgs) -> FitOptions {
    FitOptions {
        patience: args.patience,
        initial_guess: args.initial_guess.clone(),
        ..FitOptions::default()
    }
}

/// Assemble the true parameter vector from the `--a/--b/--c` flags.
pub fn sample_config_from_args(args: &SampleArgs) -> Result<SampleConfig, AppError> {
    let single = |name: &str, values: &[f64]| -> Result<f64, AppError> {
        match values {
            [v] => Ok(*v),
            _ => Err(AppError::new(
                2,
                format!("`--{name}` takes a single value for the {:?} model", args.model),
            )),
        }
    };

    let (model, params) = match args.model {
        ModelSpec::Power => (ModelKind::PowerLaw, vec![single("a", &args.a)?, single("b", &args.b)?]),
        ModelSpec::Parabolic => (
            ModelKind::Parabolic,
            vec![single("a", &args.a)?, single("b", &args.b)?, args.c],
        ),
        ModelSpec::Kelvin => {
            if args.a.len() != args.b.len() {
                return Err(AppError::new(
                    2,
                    format!("Kelvin sample needs as many rates ({}) as amplitudes ({})", args.b.len(), args.a.len()),
                ));
            }
            let terms = args.a.len();
            (ModelKind::Kelvin { terms }, args.a.iter().chain(&args.b).copied().collect())
        }
    };

    Ok(SampleConfig {
        model,
        params,
        points: args.points,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        seed: args.seed,
    })
}
