//! Command-line front ends for common NGLess pipelines.
//!
//! Each subcommand builds a small NGLess script from its flags and hands it
//! to `ngless`.
//!
//! # Usage
//!
//! ```bash
//! # Map single-end reads against a builtin reference
//! nglscript map -i reads.fq -r hg19 -o mapped.sam
//!
//! # Paired-end reads against a FASTA file, with 8 threads
//! nglscript -j 8 map -i r1.fq -2 r2.fq -s singles.fq -f genome.fa -o mapped.sam
//!
//! # Print the generated script instead of running it
//! nglscript --dry-run count -i mapped.sam -o counts.txt -m 1overN
//!
//! # Quality-trim reads, dropping anything shorter than 40 bases
//! nglscript trim -i reads.fq -m substrim -q 25 -d 40 -o trimmed.fq
//!
//! # Install ngless into ~/.local/bin
//! nglscript install -m user
//! ```

mod pipelines;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use nglscript_core::config::NglessConfig;
use nglscript_core::error::DslError;
use nglscript_core::install::{InstallError, InstallMode, Installer, DEFAULT_DOWNLOAD_URL};
use nglscript_core::runner::{RunError, RunOptions, Runner};
use nglscript_core::script::Script;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pipelines::{
    CountArgs, MapArgs, MapstatsArgs, PipelineError, SelectArgs, TrimArgs, UniqueArgs,
};

/// Generate and run canned NGLess pipelines.
#[derive(Parser)]
#[command(name = "nglscript")]
#[command(about = "Generate and run canned NGLess pipelines")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every pipeline.
#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Install ngless if it is not found
    #[arg(long, global = true)]
    auto_install: bool,

    /// Log the generated script to stderr before running it
    #[arg(long, global = true)]
    debug: bool,

    /// Print the generated script and exit without running it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Number of threads ngless may use
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Path to the ngless executable
    #[arg(long, global = true, env = "NGLESS_BIN")]
    ngless_bin: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Map reads against a builtin reference or a FASTA file
    Map(MapArgs),

    /// Count reads per feature in a SAM/BAM file
    Count(CountArgs),

    /// Quality-trim reads and discard short ones
    Trim(TrimArgs),

    /// Keep or drop alignments matching conditions
    Select(SelectArgs),

    /// Compute mapping statistics
    Mapstats(MapstatsArgs),

    /// Drop duplicated reads
    Unique(UniqueArgs),

    /// Download the ngless binary
    Install {
        /// Overwrite an existing installation
        #[arg(short, long)]
        force: bool,

        /// Install to this exact path
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Install for the current user or system-wide
        #[arg(short, long, value_enum, required_unless_present = "target")]
        mode: Option<ModeArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ModeArg {
    User,
    Global,
}

impl From<ModeArg> for InstallMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::User => InstallMode::User,
            ModeArg::Global => InstallMode::Global,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // --debug raises the default level so the runner's script log shows.
    let default_level = if cli.run.debug { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    PipelineFailed(String),
    Usage(String),
    Script(DslError),
    Install(InstallError),
    Io(std::io::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::PipelineFailed(_) => ExitCode::from(1),
            CliError::Usage(_) | CliError::Script(_) => ExitCode::from(2),
            CliError::Install(_) => ExitCode::from(3),
            CliError::Io(_) => ExitCode::from(4),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::PipelineFailed(msg) => write!(f, "Pipeline failed: {}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Script(e) => write!(f, "Could not build script: {}", e),
            CliError::Install(e) => write!(f, "Install failed: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl From<DslError> for CliError {
    fn from(e: DslError) -> Self {
        CliError::Script(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Script(e) => CliError::Script(e),
            PipelineError::MissingOption(msg) => CliError::Usage(msg.to_string()),
        }
    }
}

impl From<InstallError> for CliError {
    fn from(e: InstallError) -> Self {
        CliError::Install(e)
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::Failed(status) => CliError::PipelineFailed(format!("ngless exited with {}", status)),
            RunError::Install(e) => CliError::Install(e),
            RunError::Io(e) => CliError::Io(e),
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = NglessConfig::load();
    let download_url = config
        .download_url
        .clone()
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_URL.to_string());

    let script = match cli.command {
        Command::Install { force, target, mode } => {
            let installer = Installer::unconfigured()
                .with_mode(mode.map(InstallMode::from))
                .with_target(target)
                .force(force)
                .with_url(download_url);
            let path = installer.target_path()?;
            if cli.run.dry_run {
                println!("Would install ngless to {} from {}", path.display(), installer.url());
                return Ok(());
            }
            if installer.install().await? {
                println!("Installed ngless to {}", path.display());
            } else {
                eprintln!(
                    "ngless already present at {} (use --force to overwrite)",
                    path.display()
                );
            }
            return Ok(());
        }
        Command::Map(args) => args.script()?,
        Command::Count(args) => args.script()?,
        Command::Trim(args) => args.script()?,
        Command::Select(args) => args.script()?,
        Command::Mapstats(args) => args.script()?,
        Command::Unique(args) => args.script()?,
    };

    execute(&script, &cli.run, &config, download_url).await
}

async fn execute(
    script: &Script,
    run: &RunArgs,
    config: &NglessConfig,
    download_url: String,
) -> Result<(), CliError> {
    if run.dry_run {
        print!("{}", script);
        return Ok(());
    }
    debug!(statements = script.statements().len(), "Built script");

    let options = RunOptions {
        binary: run
            .ngless_bin
            .clone()
            .or_else(|| config.ngless_binary.clone())
            .unwrap_or_else(|| PathBuf::from("ngless")),
        threads: run.threads.or(config.default_threads),
        extra_args: Vec::new(),
        auto_install: run
            .auto_install
            .then(|| Installer::new(InstallMode::User).with_url(download_url)),
        verbose: run.debug,
    };
    info!(binary = %options.binary.display(), threads = ?options.threads, "Running pipeline");

    Runner::new(options).run(script).await?;
    Ok(())
}
