//! Team commands

use clap::{Args, Subcommand};
use roster_core::{Config, Member, NewTeam};

use super::{open_engine, print_json};

#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team, moving any listed existing users into it
    Add {
        /// Team name
        name: String,

        /// Member as ID:USERNAME, or ID:USERNAME:inactive
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<Member>,
    },

    /// Show a team and its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let engine = open_engine(config).await?;
        match &self.command {
            TeamCommand::Add { name, members } => {
                let team = engine
                    .create_team(NewTeam::new(name.clone(), members.clone()))
                    .await?;
                print_json(&serde_json::json!({ "team": team }))
            }
            TeamCommand::Get { name } => print_json(&engine.get_team(name).await?),
        }
    }
}

/// Parse `ID:USERNAME[:active|:inactive]`
fn parse_member(value: &str) -> Result<Member, String> {
    let mut parts = value.splitn(3, ':');
    let (Some(user_id), Some(username)) = (parts.next(), parts.next()) else {
        return Err(format!("expected ID:USERNAME, got {:?}", value));
    };
    if user_id.is_empty() || username.is_empty() {
        return Err(format!("expected ID:USERNAME, got {:?}", value));
    }

    let member = Member::new(user_id, username);
    match parts.next() {
        None | Some("active") => Ok(member),
        Some("inactive") => Ok(member.inactive()),
        Some(other) => Err(format!("unknown member state {:?}", other)),
    }
}
