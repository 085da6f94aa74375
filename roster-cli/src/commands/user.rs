//! User commands

use clap::{Args, Subcommand};
use roster_core::Config;

use super::{open_engine, print_json};

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Activate or deactivate a user; deactivation reassigns their open reviews
    SetActive {
        user_id: String,

        #[arg(action = clap::ArgAction::Set)]
        is_active: bool,
    },

    /// List pull requests the user reviews
    Reviews { user_id: String },
}

impl UserArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let engine = open_engine(config).await?;
        match &self.command {
            UserCommand::SetActive { user_id, is_active } => {
                let user = engine.set_user_active(user_id, *is_active).await?;
                print_json(&serde_json::json!({ "user": user }))
            }
            UserCommand::Reviews { user_id } => {
                let pull_requests = engine.get_reviewed_prs(user_id).await?;
                print_json(&serde_json::json!({
                    "user_id": user_id,
                    "pull_requests": pull_requests,
                }))
            }
        }
    }
}
