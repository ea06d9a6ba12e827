pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::app::{FeedError, Result};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "scrollfeed")]
#[command(about = "Renders a JSON content feed as an incrementally loaded page", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/scrollfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Feed document to try; repeat to give fallbacks in order
    #[arg(short, long = "source", global = true)]
    pub sources: Vec<String>,

    /// Base url that relative sources are joined to
    #[arg(short, long, global = true)]
    pub base: Option<String>,

    /// Items appended per page
    #[arg(short = 'n', long, global = true)]
    pub page_size: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the feed and write it out as an HTML page
    Render {
        /// Output file
        #[arg(short, long, default_value = "feed.html")]
        out: PathBuf,

        /// Pages to load, one simulated scroll each (default: until exhausted)
        #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        pages: Option<usize>,

        /// Open the written page in the default browser
        #[arg(long)]
        open: bool,

        /// Print the final loader status as JSON
        #[arg(long)]
        status: bool,
    },
    /// List the normalized, deduplicated items
    Items,
    /// Try every source candidate and report which ones load
    Check,
}

impl Cli {
    /// Folds the command-line overrides into `config`.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if !self.sources.is_empty() {
            config.sources.candidates = self.sources.clone();
        }
        if let Some(base) = &self.base {
            config.sources.base_url = Some(base.clone());
        }
        if let Some(page_size) = self.page_size {
            config.feed.page_size = page_size;
        }
        config
            .validate()
            .map_err(|e| FeedError::Config(e.to_string()))
    }
}
