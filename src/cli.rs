use std::path::PathBuf;

use clap::Parser;

/// Built-in test endpoint used when no URL is given.
pub const DEFAULT_URL: &str = "http://test-debit.free.fr/image.iso";

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Plot live download bandwidth in the terminal", long_about = None)]
pub struct Cli {
    /// URL to download
    #[arg(default_value = DEFAULT_URL)]
    pub url: String,

    /// Write the downloaded payload to this file (discarded when omitted)
    pub output: Option<PathBuf>,
}
