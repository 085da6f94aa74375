//! Pull request commands

use clap::{Args, Subcommand};
use roster_core::{Config, NewPullRequest};

use super::{open_engine, print_json};

#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        pr_id: String,

        title: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Mark a pull request merged
    Merge { pr_id: String },

    /// Swap one reviewer for another member of their team
    Reassign {
        pr_id: String,

        /// Reviewer to replace
        #[arg(short, long)]
        old_reviewer: String,
    },
}

impl PrArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let engine = open_engine(config).await?;
        match &self.command {
            PrCommand::Create {
                pr_id,
                title,
                author,
            } => {
                let pr = engine
                    .create_pr(NewPullRequest::new(pr_id.clone(), title.clone(), author.clone()))
                    .await?;
                tracing::info!(pr_id = %pr.id, reviewers = ?pr.reviewers, "Pull request created");
                print_json(&serde_json::json!({ "pr": pr }))
            }
            PrCommand::Merge { pr_id } => {
                let pr = engine.merge_pr(pr_id).await?;
                print_json(&serde_json::json!({ "pr": pr }))
            }
            PrCommand::Reassign {
                pr_id,
                old_reviewer,
            } => print_json(&engine.reassign_pr(pr_id, old_reviewer).await?),
        }
    }
}
