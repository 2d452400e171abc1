use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Windows 11 release watcher with deterministic CI build-matrix generation
#[derive(Parser, Debug)]
#[command(
    name = "isowatch",
    about = "Windows 11 release watcher with deterministic CI build-matrix generation",
    version,
    author,
    long_about = "isowatch polls the UUP Dump release index for Windows 11 builds it has \
                  not seen before, classifies each into a canonical version label, records \
                  it in a persistent ledger, and emits a deterministic build matrix for \
                  downstream CI pipelines."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run release detection once",
        long_about = "Fetches candidate releases from the index, records previously unseen \
                      builds in the ledger, and emits the expanded build matrix.\n\n\
                      Examples:\n  \
                      isowatch detect\n  \
                      isowatch detect --format actions --output step_output.txt\n  \
                      isowatch detect --tracking-file /var/lib/isowatch/ledger.json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Show ledger bookkeeping",
        long_about = "Prints the tracked build count, check counter, and most recent \
                      detections from the ledger.\n\n\
                      Examples:\n  \
                      isowatch status\n  \
                      isowatch status --format json"
    )]
    Status(StatusArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        long,
        help = "Run unconditionally (external schedulers may gate invocations; the detection core never does)"
    )]
    pub force: bool,

    #[arg(
        long,
        help = "Advise the downstream CI layer to skip builds; the matrix is still computed and emitted"
    )]
    pub skip_build: bool,

    #[arg(long, value_name = "FILE", help = "Release tracking file")]
    pub tracking_file: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "SECONDS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, value_name = "FILE", help = "Release tracking file")]
    pub tracking_file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
    /// CI step-output lines (has_new=, releases_matrix=, ...)
    Actions,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
            OutputFormatArg::Actions => super::output::OutputFormat::Actions,
        }
    }
}
