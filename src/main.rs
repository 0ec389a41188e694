//! Command-line front end for the border inspection simulator
//!
//! Loads and validates a configuration file, runs the requested number of
//! stochastic simulations, prints a summary, and optionally writes F280
//! records and pretty-printed consignments.
//!
//! Exit codes: 0 on success, 2 on configuration validation failure, 1 on
//! runtime errors.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use inspection_sim::orchestrator::{run_simulation, RunOptions, SimulationTotals};
use inspection_sim::outputs::PrettyStyle;
use inspection_sim::SimulationConfig;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PrettyArg {
    #[value(name = "boxes")]
    Boxes,
    #[value(name = "items")]
    Items,
    #[value(name = "boxes_only")]
    BoxesOnly,
}

impl From<PrettyArg> for PrettyStyle {
    fn from(arg: PrettyArg) -> Self {
        match arg {
            PrettyArg::Boxes => PrettyStyle::Boxes,
            PrettyArg::Items => PrettyStyle::Items,
            PrettyArg::BoxesOnly => PrettyStyle::BoxesOnly,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "inspection-sim",
    about = "Stochastic simulator of agricultural border inspections",
    version
)]
struct Args {
    /// Number of stochastic simulation runs
    #[arg(long, default_value_t = 1)]
    num_simulations: usize,

    /// Number of consignments per run
    #[arg(long, default_value_t = 100)]
    num_consignments: usize,

    /// Configuration file (YAML or JSON)
    #[arg(long)]
    config_file: PathBuf,

    /// File for F280 output records ("-" for stdout)
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Master seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Pretty-print each consignment of the first run
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "boxes")]
    pretty: Option<PrettyArg>,

    /// Collect per-consignment records
    #[arg(long)]
    detailed: bool,

    /// Worker threads for independent simulation runs
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match SimulationConfig::from_file(&args.config_file) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let options = RunOptions {
        detailed: args.detailed,
        pretty: args.pretty.map(PrettyStyle::from),
        emit_f280: args.output_file.is_some(),
        cancel: None,
        num_threads: args.threads,
    };

    let totals = match run_simulation(
        &config,
        args.num_simulations,
        args.num_consignments,
        args.seed,
        &options,
    ) {
        Ok(totals) => totals,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    for rendition in &totals.pretty_renditions {
        println!("{rendition}");
    }

    if let Some(path) = &args.output_file {
        if let Err(err) = write_f280_records(path, &totals) {
            eprintln!("error: cannot write F280 records: {err}");
            return ExitCode::FAILURE;
        }
    }

    print_totals(&totals);
    ExitCode::SUCCESS
}

fn write_f280_records(path: &PathBuf, totals: &SimulationTotals) -> std::io::Result<()> {
    if path.as_os_str() == "-" {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for record in &totals.f280_records {
            writeln!(out, "{record}")?;
        }
        return Ok(());
    }
    let mut out = BufWriter::new(File::create(path)?);
    for record in &totals.f280_records {
        writeln!(out, "{record}")?;
    }
    Ok(())
}

fn print_totals(totals: &SimulationTotals) {
    println!("Simulations:                {}", totals.num_simulations);
    if !totals.complete {
        println!("(cancelled: partial aggregates)");
    }
    println!("Missed consignments:        {:.2}%", totals.missing_pct);
    println!("False negatives per run:    {:.2}", totals.false_negatives);
    println!(
        "Missed within tolerance:    {:.2}",
        totals.missed_within_tolerance
    );
    println!("Intercepted per run:        {:.2}", totals.intercepted);
    println!("Inspections per run:        {:.2}", totals.num_inspections);
    println!(
        "True contamination rate:    {:.4}",
        totals.true_contamination_rate
    );
    println!(
        "Boxes opened (completion):  {:.2} ({:.2}%)",
        totals.avg_boxes_opened_completion, totals.pct_boxes_opened_completion
    );
    println!(
        "Boxes opened (detection):   {:.2} ({:.2}%)",
        totals.avg_boxes_opened_detection, totals.pct_boxes_opened_detection
    );
    println!(
        "Items inspected (completion): {:.2} ({:.2}%)",
        totals.avg_items_inspected_completion, totals.pct_items_inspected_completion
    );
    println!(
        "Items inspected (detection):  {:.2} ({:.2}%)",
        totals.avg_items_inspected_detection, totals.pct_items_inspected_detection
    );
    if let Some(rate) = totals.avg_missed_contamination_rate {
        println!("Avg missed contamination rate:      {rate:.4}");
    }
    if let Some(rate) = totals.max_missed_contamination_rate {
        println!("Max missed contamination rate:      {rate:.4}");
    }
    if let Some(rate) = totals.avg_intercepted_contamination_rate {
        println!("Avg intercepted contamination rate: {rate:.4}");
    }
    if let Some(rate) = totals.max_intercepted_contamination_rate {
        println!("Max intercepted contamination rate: {rate:.4}");
    }
    println!(
        "Contaminants intercepted/missed per run: {:.2} / {:.2}",
        totals.total_intercepted_contaminants, totals.total_missed_contaminants
    );
    println!(
        "In-sample contaminants missed (detection / completion): {:.2} / {:.2}",
        totals.sample_missed_contaminants_to_detection,
        totals.sample_missed_contaminants_to_completion
    );
    println!(
        "Contaminant unreported if stopping at detection: {:.2}%",
        totals.pct_contaminant_unreported_if_detection
    );
}
