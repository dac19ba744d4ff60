//! Command-line driver: reads an edge list, computes the minimum cycle basis and writes one of
//! the report formats.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcb::{io, AllocationStrategy, McbConfig, MinimumCycleBasis};

#[cfg(feature = "alloc-mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Output written to OUTPUT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Append one fixed-width stats line.
    #[default]
    Stats,
    /// Write the basis cycles as input edge lists.
    Basis,
    /// Write the contracted graph in Matrix Market format.
    Reduced,
}

/// Minimum cycle basis of a weighted undirected graph.
#[derive(Debug, Parser)]
#[command(name = "mcb", version, about)]
struct Cli {
    /// Input graph: `nodes edges` then `u v weight` lines, 1-indexed.
    input: PathBuf,
    /// Output file.
    output: PathBuf,
    /// Worker threads.
    #[arg(default_value_t = 1)]
    threads: usize,
    /// What to write to OUTPUT.
    #[arg(long, value_enum, default_value_t = Mode::Stats)]
    mode: Mode,
    /// Allocate tree storage in page-locked memory.
    #[arg(long)]
    pinned: bool,
    /// Trees per storage chunk (0 = one chunk).
    #[arg(long)]
    chunk_size: Option<usize>,
    /// JSON file with an `McbConfig`; command-line values take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter for stderr, e.g. `info` or `mcb=debug`.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> Result<McbConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => McbConfig::default(),
        };
        config.threads = self.threads;
        if let Some(chunk) = self.chunk_size {
            config.chunk_size = chunk;
        }
        if self.pinned {
            config.allocation = AllocationStrategy::Pinned;
        }
        Ok(config)
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("invalid log level `{level}`"))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    let graph = io::read_graph(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        threads = config.threads,
        "loaded graph"
    );

    match cli.mode {
        Mode::Reduced => {
            let reduction = mcb::Reduction::contract(&graph, config.contract_to_fixed_point)?;
            io::write_matrix_market(&cli.output, reduction.graph())?;
        }
        Mode::Stats => {
            let basis = MinimumCycleBasis::compute(&graph, &config)?;
            io::append_stats_line(&cli.output, &basis.stats)?;
        }
        Mode::Basis => {
            let basis = MinimumCycleBasis::compute(&graph, &config)?;
            io::write_basis(&cli.output, &basis)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            // usage problems go to stdout with exit code 1
            println!("{err}");
            return ExitCode::from(1);
        }
        Err(err) => {
            // --help / --version
            print!("{err}");
            return ExitCode::SUCCESS;
        }
    };

    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("error: {err:#}");
        return ExitCode::from(1);
    }
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positionals_and_defaults() {
        let cli = Cli::try_parse_from(["mcb", "in.txt", "out.txt"]).unwrap();
        assert_eq!(cli.threads, 1);
        assert_eq!(cli.mode, Mode::Stats);
        assert_eq!(cli.log_level, "warn");
        let cfg = cli.config().unwrap();
        assert_eq!(cfg.threads, 1);
        assert_eq!(cfg.allocation, AllocationStrategy::Heap);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "mcb", "in.txt", "out.txt", "4", "--mode", "basis", "--pinned", "--chunk-size", "16",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Basis);
        let cfg = cli.config().unwrap();
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.chunk_size, 16);
        assert_eq!(cfg.allocation, AllocationStrategy::Pinned);
    }

    #[test]
    fn test_missing_output_is_a_usage_error() {
        let err = Cli::try_parse_from(["mcb", "in.txt"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = Cli::try_parse_from(["mcb", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
