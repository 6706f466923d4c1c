use anyhow::{bail, Context};
use cache_simulator::generator::{ShiftingTraceConfig, ShiftingTraceGenerator};
use cache_simulator::input::{read_trace, TraceFormat};
use cache_simulator::models::{Algorithm, SimulationConfig};
use cache_simulator::runner::SimulationRunner;
use cache_simulator::stats::SimulationStats;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Trace-driven comparison of LFU, LFUDA and the Belady optimum
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace through the selected policies
    Run {
        /// Trace file; reads stdin when omitted
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Layout of the trace
        #[arg(short, long, value_enum, default_value_t = TraceFormat::Classic)]
        format: TraceFormat,

        /// Cache capacity; overrides the trace header, required for `lines`
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Algorithms to simulate (lfu, lfuda, belady)
        /// If not provided, all algorithms will be used
        #[arg(short, long, value_name = "ALGOS", value_enum, num_args = 1.., value_delimiter = ',')]
        algorithms: Option<Vec<Algorithm>>,

        /// Write per-algorithm results to this CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },

    /// Write a synthetic classic-format trace whose hot set shifts over time
    Generate {
        /// Total number of requests
        #[arg(long, default_value = "100000")]
        requests: usize,

        /// Number of distinct keys
        #[arg(long, default_value = "10000")]
        keys: usize,

        /// Keys in each phase's hot window
        #[arg(long, default_value = "100")]
        hot_set: usize,

        /// Number of times the hot window moves
        #[arg(long, default_value = "4")]
        phases: usize,

        /// RNG seed for a reproducible trace
        #[arg(long)]
        seed: Option<u64>,

        /// Capacity written into the header (defaults to the hot set size)
        #[arg(long)]
        capacity: Option<usize>,

        /// Output file
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Commands::Run {
            input,
            format,
            capacity,
            algorithms,
            output_csv,
        } => {
            let trace = read_trace(input.as_deref(), format).context("failed to load trace")?;
            let Some(capacity) = capacity.or(trace.capacity) else {
                bail!("--capacity is required when the trace has no header");
            };
            if trace.capacity.is_some_and(|header| header != capacity) {
                tracing::info!(capacity, "overriding trace header capacity");
            }

            let config = SimulationConfig {
                capacity,
                algorithms: algorithms.unwrap_or_else(Algorithm::all),
                output_csv,
            };
            run_simulation(config, &trace)
        }
        Commands::Generate {
            requests,
            keys,
            hot_set,
            phases,
            seed,
            capacity,
            output,
        } => {
            let config = ShiftingTraceConfig {
                requests,
                keys,
                hot_set,
                phases,
                seed,
                capacity,
            };
            let generator = ShiftingTraceGenerator::new(config)?;
            generator.generate(&output)?;
            println!("Trace written to {}", output.display());
            Ok(())
        }
    }
}

fn run_simulation(
    mut config: SimulationConfig,
    trace: &cache_simulator::models::Trace,
) -> anyhow::Result<()> {
    config.algorithms.sort();
    config.algorithms.dedup();
    tracing::info!(
        capacity = config.capacity,
        requests = trace.keys.len(),
        algorithms = ?config.algorithms,
        "starting simulation"
    );

    let runner = SimulationRunner::new(config.clone());
    let result = runner.run(trace).context("simulation failed")?;

    let stats = SimulationStats::new(&result);
    stats.print_summary();

    if let Some(path) = &config.output_csv {
        stats
            .export_csv(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nResults exported to {}", path.display());
    }
    Ok(())
}
