use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::StoreBackend;

#[derive(Parser, Debug)]
#[command(author, version, about = "USMS swim results analytics")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the analytics API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        /// Where session data is kept
        #[arg(long, value_enum, default_value_t = StoreArg::Memory)]
        store: StoreArg,
    },
    /// Analyze one swimmer and print a summary
    Analyze(AnalyzeArgs),
    /// Print shell completions
    Completions {
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AnalyzeArgs {
    /// USMS SwimmerID or results page URL
    #[arg(short, long, required_unless_present = "input", conflicts_with = "input")]
    pub link: Option<String>,
    /// ScrapedResults JSON file
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Write the full analysis as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Always fetch a fresh page instead of using the cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum StoreArg {
    Memory,
    Sqlite,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Memory => StoreBackend::Memory,
            StoreArg::Sqlite => StoreBackend::Sqlite,
        }
    }
}
