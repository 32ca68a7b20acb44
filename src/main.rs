mod algorithms;
mod cli;
mod config;
mod error;
mod harness;
mod jitter;
mod logging;
mod noise;
mod output;
mod timer;

use std::path::Path;
use std::process;

use clap::Parser;

use algorithms::graph::{
    COLORING_BUDGET, COLORING_EDGES, COLORING_VERTICES, TOUR_WEIGHTS, TSP_DISTANCES,
};
use algorithms::{approx_tour_cost, graph_coloring, tsp_exact};
use algorithms::{AdjacencyMatrix, DistanceMatrix, WeightedGraph};
use cli::{Cli, Command, HarnessArgs};
use config::Config;
use error::Error;
use harness::{SampleHarness, SampleSummary};
use jitter::JitterCollector;
use noise::OperationKind;

/// Build a Config by layering: defaults → TOML file → CLI overrides.
fn build_config(config_file: Option<&Path>, args: &HarnessArgs) -> Config {
    let mut cfg = match config::load_config(config_file) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{}", e);
            Config::default()
        }
    };

    // Apply CLI overrides (only if explicitly set)
    if let Some(v) = args.operation {
        cfg.harness.operation = v;
    }
    if let Some(v) = args.timer {
        cfg.harness.timer = v;
    }
    if let Some(v) = args.samples {
        cfg.harness.samples = Some(v);
    }
    if let Some(v) = args.max_failures {
        cfg.harness.max_failures = v;
    }
    if let Some(v) = args.oversampling_rate {
        cfg.jitter.oversampling_rate = v;
    }
    if let Some(v) = args.jitter_flags {
        cfg.jitter.flags = v;
    }
    if let Some(v) = args.allow_syscall_trap {
        cfg.capabilities.syscall_trap = v;
    }
    if let Some(v) = args.allow_software_interrupt {
        cfg.capabilities.software_interrupt = v;
    }

    cfg.validate();
    cfg
}

fn collect_samples(cfg: &Config) -> Result<Vec<u64>, Error> {
    let kind = cfg.harness.operation;
    let count = cfg.harness.sample_count();

    let mut collector = JitterCollector::with_default_backend(&cfg.jitter);
    let samples = {
        let mut op = noise::build(kind, &cfg.capabilities, &mut collector)?;
        log::info!(
            "timing {} with the {} timer, {} samples",
            op.name(),
            cfg.harness.timer.name(),
            count
        );
        SampleHarness::new().collect(
            cfg.harness.timer,
            op.as_mut(),
            count,
            cfg.harness.max_failures,
        )?
    };
    collector.close();
    Ok(samples)
}

fn run_collect(cli: &Cli, cfg: &Config) {
    let samples = match collect_samples(cfg) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    let summary = SampleSummary::from_samples(&samples);
    log::info!(
        "{} samples: min={} max={} distinct={} duplicates={}",
        summary.count,
        summary.min,
        summary.max,
        summary.distinct,
        summary.duplicates
    );
    if summary.is_constant() {
        log::warn!(
            "all {} samples equal {}; the {} timer shows no jitter here",
            summary.count,
            summary.min,
            cfg.harness.timer.name()
        );
    }

    if let Err(e) = output::write_samples(&samples, &cli.format, cli.output_file.as_deref()) {
        log::error!("error writing output: {}", e);
        process::exit(1);
    }
}

fn run_list(cfg: &Config) {
    println!("{:<20} {:>8}  {:<12} DESCRIPTION", "OPERATION", "SAMPLES", "STATUS");
    for kind in OperationKind::ALL {
        let status = match kind.check_available(&cfg.capabilities) {
            Ok(()) => "available".to_string(),
            Err(e) => {
                log::debug!("{}: {}", kind.name(), e);
                match e {
                    Error::Unsupported(msg) if msg.contains("disabled") => "disabled".to_string(),
                    _ => "unsupported".to_string(),
                }
            }
        };
        println!(
            "{:<20} {:>8}  {:<12} {}",
            kind.name(),
            kind.suggested_samples(),
            status,
            kind.description()
        );
    }
}

fn run_workloads() -> Result<(), Error> {
    // Rebuilt through the checked constructors so a bad edit to the fixed
    // instances is reported here instead of timed.
    let tour = WeightedGraph::new(TOUR_WEIGHTS)?;
    println!("tsp-approx: MST tour cost {}", approx_tour_cost(&tour)?);

    let cities = DistanceMatrix::new(TSP_DISTANCES)?;
    println!("tsp-exact: shortest tour from city 0 costs {}", tsp_exact(&cities, 0)?);

    let graph = AdjacencyMatrix::<COLORING_VERTICES>::from_edges(&COLORING_EDGES)?;
    match graph_coloring(&graph, COLORING_BUDGET) {
        Some(assignment) => {
            let colors: Vec<String> = assignment.colors().iter().map(|c| c.to_string()).collect();
            println!(
                "graph-coloring: {} colors [{}] proper={}",
                COLORING_BUDGET,
                colors.join(", "),
                assignment.is_proper(&graph)
            );
        }
        None => println!("graph-coloring: not colorable with {} colors (-1)", COLORING_BUDGET),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Command::List(args)) => {
            logging::init(&args.log);
            let cfg = build_config(args.config_file.as_deref(), &args.harness);
            run_list(&cfg);
        }
        Some(Command::Workloads(args)) => {
            logging::init(&args.log);
            if let Err(e) = run_workloads() {
                log::error!("{}", e);
                process::exit(1);
            }
        }
        None => {
            logging::init(&cli.log);
            let cfg = build_config(cli.config_file.as_deref(), &cli.harness);
            run_collect(&cli, &cfg);
        }
    }
}
