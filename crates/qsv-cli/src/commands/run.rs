//! Run command implementation.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tracing::info;

use qsv_core::{Gate, MAX_QUBITS, Simulator, bitstring};

use super::common::{load_config, nonzero_probabilities, print_counts, print_probabilities};

/// Gate lists shorter than this run without a progress bar.
const PROGRESS_THRESHOLD: usize = 64;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// A single JSON document
    Json,
}

/// Arguments of `qsv run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Number of qubits (clamped to the simulator maximum)
    #[arg(short, long)]
    pub qubits: u32,

    /// Worker threads [default: config file, then available cores]
    #[arg(short, long, env = "QSV_THREADS")]
    pub threads: Option<usize>,

    /// Gate to apply, in order (h:0, x:2, rx:0:1.57, cnot:0:1)
    #[arg(short, long = "gate")]
    pub gates: Vec<Gate>,

    /// Number of measurement samples
    #[arg(short, long, default_value = "1024")]
    pub shots: u32,

    /// Maximum number of non-zero probabilities to print
    #[arg(long, default_value = "16")]
    pub show: usize,

    /// Seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON file with simulator tuning (threads, pair_chunk, permutation_chunk)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Execute the run command.
pub fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    let threads = config.threads;

    let mut sim = Simulator::with_config(config).context("Invalid simulator configuration")?;
    sim.init(args.qubits, threads)
        .with_context(|| format!("Failed to initialize {} qubits", args.qubits))?;
    let num_qubits = sim.num_qubits();

    let table = args.format == OutputFormat::Table;
    if table {
        println!(
            "{} Simulating {} qubits on {} threads ({} gates)",
            style("→").cyan().bold(),
            style(num_qubits).green(),
            style(sim.num_threads()).yellow(),
            args.gates.len()
        );
        if args.qubits > MAX_QUBITS {
            println!(
                "  {} {} qubits requested, clamped to {}",
                style("!").yellow().bold(),
                args.qubits,
                MAX_QUBITS
            );
        }
    }

    let started = Instant::now();
    let progress = if args.gates.len() >= PROGRESS_THRESHOLD {
        let bar = ProgressBar::new(args.gates.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )?);
        bar
    } else {
        ProgressBar::hidden()
    };

    for gate in &args.gates {
        progress.set_message(gate.to_string());
        sim.apply(gate);
        progress.inc(1);
    }
    progress.finish_and_clear();
    let gate_time = started.elapsed();
    info!(
        gates = args.gates.len(),
        elapsed_ms = gate_time.as_secs_f64() * 1000.0,
        "gates applied"
    );

    let probabilities = nonzero_probabilities(&sim, args.show);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let counts = sim.sample_counts(args.shots, &mut rng);

    if table {
        print_probabilities(&probabilities, num_qubits);
        if args.shots > 0 {
            print_counts(&counts, args.shots, num_qubits);
        }
        println!(
            "\n  Execution time: {} ms",
            style(gate_time.as_millis()).yellow()
        );
        return Ok(());
    }

    let report = json!({
        "num_qubits": num_qubits,
        "threads": sim.num_threads(),
        "gates": args.gates.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "shots": args.shots,
        "probabilities": probabilities
            .iter()
            .map(|&(i, p)| (bitstring(i, num_qubits), json!(p)))
            .collect::<serde_json::Map<_, _>>(),
        "counts": counts
            .iter()
            .map(|(&i, &n)| (bitstring(i, num_qubits), json!(n)))
            .collect::<serde_json::Map<_, _>>(),
        "execution_time_ms": gate_time.as_secs_f64() * 1000.0,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
