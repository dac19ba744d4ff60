use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "mcb workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the criterion suite under each build variant and compare
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Run the release binary on one graph at several thread counts
    Scaling {
        /// Input graph in the edge-list format
        input: PathBuf,

        /// Thread counts to try
        #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 4, 8])]
        threads: Vec<usize>,

        /// Where to write the JSON summary
        #[arg(long, default_value = "benchmark_results/scaling.json")]
        out: PathBuf,
    },
}

/// Build variant: baseline name and the cargo feature flags that select it.
struct Variant {
    name: &'static str,
    flags: &'static [&'static str],
}

const VARIANTS: &[Variant] = &[
    Variant {
        name: "sequential",
        flags: &["--no-default-features"],
    },
    Variant {
        name: "parallel",
        flags: &[],
    },
    Variant {
        name: "mimalloc",
        flags: &["--features", "alloc-mimalloc"],
    },
];

/// One parsed stats line of the `mcb` binary.
#[derive(Debug, Serialize, Deserialize)]
struct ScalingRow {
    threads: usize,
    nodes_removed: usize,
    initial_cycles: usize,
    unique_cycles: usize,
    final_cycles: usize,
    total_weight: u64,
    tree_construction_time: f64,
    collect_cycles_time: f64,
    cycle_inspection_time: f64,
    independence_test_time: f64,
    total_loop_time: f64,
    wall_time: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Scaling {
            input,
            threads,
            out,
        } => run_scaling(&input, &threads, &out)?,
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running comparative benchmarks...");

    for variant in VARIANTS {
        println!("\n>>> Benchmarking variant: {}", variant.name);
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.args(["bench", "-p", "mcb", "--bench", "mcb_benchmark"]);
        cmd.args(variant.flags);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        cmd.arg("--save-baseline").arg(variant.name);

        if quick {
            cmd.arg("--measurement-time").arg("0.1");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench for {}", variant.name))?;

        if status.success() {
            println!("Finished {} in {:.2?}", variant.name, start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for {}", variant.name);
        }
    }

    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let mut results: HashMap<String, HashMap<String, f64>> = HashMap::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    collect_results(criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Comparative Benchmark Report")?;

    let mut workloads: Vec<_> = results.keys().collect();
    workloads.sort();

    write!(file, "| Workload |")?;
    for variant in VARIANTS {
        write!(file, " {} (Ops/s) | vs sequential |", variant.name)?;
    }
    writeln!(file)?;

    write!(file, "|---|")?;
    for _ in VARIANTS {
        write!(file, "---|---|")?;
    }
    writeln!(file)?;

    for workload in workloads {
        write!(file, "| {} |", workload)?;

        let baseline_ops = results
            .get(workload)
            .and_then(|m| m.get("sequential"))
            .copied()
            .unwrap_or(0.0);

        for variant in VARIANTS {
            if let Some(ops) = results.get(workload).and_then(|m| m.get(variant.name)) {
                let rel = if baseline_ops > 0.0 { ops / baseline_ops } else { 0.0 };
                write!(file, " {} | **{:.2}x** |", format_ops(*ops), rel)?;
            } else {
                write!(file, " N/A | - |")?;
            }
        }
        writeln!(file)?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{:.0}", ops)
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_string)
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn collect_results(dir: &Path, results: &mut HashMap<String, HashMap<String, f64>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results);
            continue;
        }
        if file_name(&path).as_deref() != Some("estimates.json") {
            continue;
        }
        // Structure: .../workload/baseline/estimates.json
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let (Some(baseline), Some(workload)) = (file_name(baseline_dir), file_name(workload_dir))
        else {
            continue;
        };
        if baseline == "report" || workload == "report" {
            continue;
        }

        let elements = read_json(&workload_dir.join("benchmark.json"))
            .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64());
        let Some(time_ns) = read_json(&path)
            .and_then(|json| json.get("mean")?.get("point_estimate")?.as_f64())
            .filter(|&t| t > 0.0)
        else {
            continue;
        };

        let metric = elements.unwrap_or(1.0) * 1e9 / time_ns;
        results.entry(workload).or_default().insert(baseline, metric);
    }
}

fn run_scaling(input: &Path, threads: &[usize], out: &Path) -> Result<()> {
    println!("Building release binary...");
    let status = Command::new("cargo")
        .args(["build", "--release", "-p", "mcb", "--bin", "mcb"])
        .status()?;
    if !status.success() {
        anyhow::bail!("Failed to build mcb");
    }

    let scratch = std::env::temp_dir().join(format!("mcb-scaling-{}", std::process::id()));
    fs::create_dir_all(&scratch)?;

    let mut rows = Vec::with_capacity(threads.len());
    for &t in threads {
        let stats_path = scratch.join(format!("stats-{t}.txt"));
        let _ = fs::remove_file(&stats_path);

        let start = Instant::now();
        let status = Command::new("target/release/mcb")
            .arg(input)
            .arg(&stats_path)
            .arg(t.to_string())
            .status()
            .with_context(|| format!("Failed to run mcb with {t} threads"))?;
        let wall_time = start.elapsed().as_secs_f64();
        if !status.success() {
            anyhow::bail!("mcb failed with {t} threads");
        }

        let line = fs::read_to_string(&stats_path)
            .with_context(|| format!("Reading {}", stats_path.display()))?;
        let row = parse_stats_line(t, line.trim(), wall_time)
            .with_context(|| format!("Malformed stats line: {line}"))?;
        println!(
            "threads {:>3}: {} cycles, weight {}, loop {:.3}s, wall {:.3}s",
            t, row.final_cycles, row.total_weight, row.total_loop_time, row.wall_time
        );
        rows.push(row);
    }

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    let _ = fs::remove_dir_all(&scratch);
    println!("Summary written to {}", out.display());
    Ok(())
}

fn parse_stats_line(threads: usize, line: &str, wall_time: f64) -> Result<ScalingRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 10 {
        anyhow::bail!("expected 10 fields, found {}", fields.len());
    }
    Ok(ScalingRow {
        threads,
        nodes_removed: fields[0].parse()?,
        initial_cycles: fields[1].parse()?,
        unique_cycles: fields[2].parse()?,
        final_cycles: fields[3].parse()?,
        total_weight: fields[4].parse()?,
        tree_construction_time: fields[5].parse()?,
        collect_cycles_time: fields[6].parse()?,
        cycle_inspection_time: fields[7].parse()?,
        independence_test_time: fields[8].parse()?,
        total_loop_time: fields[9].parse()?,
        wall_time,
    })
}
