use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logging::LogArgs;
use crate::noise::OperationKind;
use crate::timer::TimerKind;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// One decimal duration per line
    Decimal,
    /// One zero-padded lowercase hex duration per line
    Hex,
    /// Little-endian 8-byte durations
    Raw,
    /// Base64 of the raw stream (standard, with padding)
    Base64,
    /// Base64 URL-safe of the raw stream (no padding)
    Base64url,
}

#[derive(Debug, Args)]
pub struct HarnessArgs {
    /// Noise operation to time
    #[arg(short = 'p', long = "operation", value_enum)]
    pub operation: Option<OperationKind>,

    /// Timer used for each sample
    #[arg(short = 't', long = "timer", value_enum)]
    pub timer: Option<TimerKind>,

    /// Number of samples (default: the operation's suggested count)
    #[arg(short = 'n', long = "samples")]
    pub samples: Option<usize>,

    /// Failed samples tolerated before giving up
    #[arg(long)]
    pub max_failures: Option<usize>,

    /// Jitter collector oversampling rate (1-64)
    #[arg(long)]
    pub oversampling_rate: Option<u32>,

    /// Jitter collector flags bitset
    #[arg(long = "jitter-flags")]
    pub jitter_flags: Option<u32>,

    /// Allow the raw syscall trap operation
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub allow_syscall_trap: Option<bool>,

    /// Allow the software interrupt operation (may kill the process on some kernels)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub allow_software_interrupt: Option<bool>,
}

#[derive(Debug, Parser)]
#[command(
    name = "jitterharvest",
    about = "Harvest raw timing-jitter samples from deterministic workloads"
)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Decimal)]
    pub format: OutputFormat,

    /// Write samples to a file instead of stdout
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Configuration file path (default: /etc/jitterharvest.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub harness: HarnessArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the noise operations and whether they can run here
    List(ListArgs),
    /// Run each algorithmic workload once and print its result
    Workloads(WorkloadsArgs),
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Configuration file path (default: /etc/jitterharvest.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub harness: HarnessArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Parser)]
pub struct WorkloadsArgs {
    #[command(flatten)]
    pub log: LogArgs,
}
