//! Command implementations for the waterframe CLI
//!
//! Each subcommand loads a table, applies one operation and reports what
//! happened either as colored text or as JSON.

use crate::cli::args::{Args, Commands, InfoArgs, OutputFormat, QcArgs, ResampleArgs};
use crate::constants::flags;
use crate::frame::WaterFrame;
use crate::frame::metadata::append_history;
use crate::frame::timestamps::format_timestamp;
use crate::io::{read_table, write_table};
use crate::models::QcFlag;
use crate::qc::QcReport;
use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    match args.command {
        Some(Commands::Qc(qc_args)) => run_qc(&qc_args),
        Some(Commands::Resample(resample_args)) => run_resample(&resample_args),
        Some(Commands::Info(info_args)) => run_info(&info_args),
        None => Ok(()),
    }
}

/// Set up structured logging based on verbosity level
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("waterframe={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn load(path: &std::path::Path) -> Result<WaterFrame> {
    read_table(path).with_context(|| format!("Failed to read table {}", path.display()))
}

fn save(frame: &WaterFrame, path: &std::path::Path) -> Result<()> {
    write_table(frame, path).with_context(|| format!("Failed to write table {}", path.display()))
}

fn run_qc(args: &QcArgs) -> Result<()> {
    let start = Instant::now();
    args.validate()?;
    let config = args.build_config().context("Invalid QC configuration")?;
    debug!("QC configuration: {:?}", config);

    let mut frame = load(&args.input)?;
    if args.init_flags {
        let added = frame.ensure_flag_columns()?;
        if !added.is_empty() {
            info!("Initialized flag columns for {:?}", added);
        }
    }

    let parameters: Vec<&str> = args.parameters.iter().map(String::as_str).collect();
    let report = frame.qc(&parameters, &config)?;
    append_history(
        &mut frame.metadata,
        format!("{} quality control applied", format_timestamp(Utc::now())),
    );
    save(&frame, &args.output)?;

    match args.output_format {
        OutputFormat::Human => print_qc_report(&report, args, start),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_qc_report(report: &QcReport, args: &QcArgs, start: Instant) {
    println!("\n{}", "Quality control complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("  Input:  {}", args.input.display());
    println!("  Output: {}", args.output.display());
    println!("  Warm-up rows left unflagged: {}", report.warm_up);

    for (name, counts) in [
        ("Range", &report.range),
        ("Flat", &report.flat),
        ("Spike", &report.spike),
    ] {
        for (parameter, count) in counts {
            let line = format!("  {:<6} {:<12} {} rows flagged", name, parameter, count);
            if *count > 0 {
                println!("{}", line.yellow());
            } else {
                println!("{}", line);
            }
        }
    }
    for (parameter, count) in &report.finalized {
        println!("  {:<6} {:<12} {} rows marked good", "Final", parameter, count);
    }

    println!(
        "  {} {:.2?}",
        "Elapsed:".bright_black(),
        start.elapsed()
    );
}

fn run_resample(args: &ResampleArgs) -> Result<()> {
    args.validate()?;
    let mut frame = load(&args.input)?;
    let rows_before = frame.len();

    if !frame.resample(&args.rule, args.method)? {
        warn!("{} has no TIME index; nothing was resampled", args.input.display());
        println!(
            "{} {} has no TIME index, table left unchanged",
            "Warning:".yellow().bold(),
            args.input.display()
        );
        return Ok(());
    }

    save(&frame, &args.output)?;
    println!(
        "{} {} rows resampled to {} rows ({} {})",
        "Done:".green().bold(),
        rows_before,
        frame.len(),
        args.rule,
        args.method
    );
    Ok(())
}

fn run_info(args: &InfoArgs) -> Result<()> {
    args.validate()?;
    let frame = load(&args.input)?;

    match args.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&frame.summaries()?)?);
        }
        OutputFormat::Human => {
            println!("{}", frame.info()?);
            for summary in frame.summaries()? {
                println!("\n{}", summary.parameter.bold());
                for (code, count) in summary.flag_counts.iter().enumerate() {
                    if *count == 0 {
                        continue;
                    }
                    let Ok(flag) = QcFlag::try_from(code as i32) else {
                        continue;
                    };
                    let code = flag.code();
                    let label = format!("  {} {:<28} {}", code, flag.description(), count);
                    match code {
                        flags::GOOD | flags::PROBABLY_GOOD => println!("{}", label.green()),
                        flags::BAD | flags::POTENTIALLY_CORRECTABLE => println!("{}", label.red()),
                        flags::MISSING => println!("{}", label.bright_black()),
                        _ => println!("{}", label),
                    }
                }
            }
        }
    }
    Ok(())
}
