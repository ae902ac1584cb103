use clap::Parser;
use std::process;
use waterframe::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("WaterFrame - Ocean Observatory Quality Control");
    println!("==============================================");
    println!();
    println!("Flag, reconcile and resample TIME / DEPTH indexed ocean time series");
    println!("stored as CSV or Parquet tables with OceanSITES _QC flag columns.");
    println!();
    println!("USAGE:");
    println!("    waterframe <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    qc          Run range, flat and spike tests and write the flagged table");
    println!("    resample    Aggregate a table into coarser time buckets");
    println!("    info        Describe a table and its flag statistics");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Check temperature and salinity with the default limits:");
    println!("    waterframe qc obsea.csv -o obsea_qc.parquet -p TEMP -p PSAL");
    println!();
    println!("    # Use a tighter spike threshold and a JSON configuration file:");
    println!("    waterframe qc obsea.csv -o obsea_qc.csv --config qc.json --threshold 2.5");
    println!();
    println!("    # Hourly means of a flagged table:");
    println!("    waterframe resample obsea_qc.parquet -o hourly.parquet --rule H");
    println!();
    println!("    # Flag statistics as JSON:");
    println!("    waterframe info obsea_qc.parquet --output-format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    waterframe <COMMAND> --help");
}
