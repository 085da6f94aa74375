//! Merge statistics command

use clap::Args;
use roster_core::{Config, Page};

use super::{open_engine, print_json};

/// Merged pull requests per author
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Zero-based page of authors
    #[arg(long)]
    pub page: Option<u32>,

    /// Authors per page (all when omitted)
    #[arg(long)]
    pub limit: Option<u32>,
}

impl StatsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let engine = open_engine(config).await?;
        let stats = engine.statistics(Page::new(self.page, self.limit)).await?;
        print_json(&stats)
    }
}
