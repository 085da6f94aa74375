//! Domain records shared by the engine and the store

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum number of reviewers linked to one pull request
pub const REVIEWER_CAPACITY: usize = 2;

/// Longest accepted team name or username
pub const MAX_NAME_LEN: usize = 255;

/// Most members accepted in a single team write
pub const MAX_TEAM_MEMBERS: usize = 300;

/// Pull request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Merged is terminal; nothing leaves it
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Merged)
    }

    pub fn can_transition_to(&self, next: PrStatus) -> bool {
        matches!((self, next), (PrStatus::Open, PrStatus::Merged))
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::InvalidInput(format!(
                "unknown pull request status: {}",
                other
            ))),
        }
    }
}

/// Team membership row as supplied by a team write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl Member {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Mark the member inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// User resolved together with the name of its team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWithMembers {
    pub team_name: String,
    pub members: Vec<Member>,
}

/// Team write request: creates the team and upserts every member into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    pub members: Vec<Member>,
}

impl NewTeam {
    pub fn new(team_name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            team_name: team_name.into(),
            members,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("team_name", &self.team_name)?;
        if self.team_name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidInput("team_name is too long".to_string()));
        }
        if self.members.len() > MAX_TEAM_MEMBERS {
            return Err(Error::InvalidInput("too many members".to_string()));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            require("user_id", &member.user_id)?;
            require("username", &member.username)?;
            if member.username.chars().count() > MAX_NAME_LEN {
                return Err(Error::InvalidInput("username is too long".to_string()));
            }
            if !seen.insert(member.user_id.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "user_id {} listed more than once",
                    member.user_id
                )));
            }
        }

        Ok(())
    }

    /// Members written as inactive, in request order
    pub fn inactive_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_active)
    }
}

/// Pull request creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    pub author_id: String,
}

impl NewPullRequest {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("pull_request_id", &self.id)?;
        require("pull_request_name", &self.title)?;
        require("author_id", &self.author_id)
    }
}

/// Pull request with its current reviewer links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    pub author_id: String,
    pub status: PrStatus,
    /// Reviewer user ids in link order
    #[serde(rename = "assigned_reviewers")]
    pub reviewers: Vec<String>,
    pub need_more_reviewers: bool,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.status == PrStatus::Open
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.reviewers.iter().any(|r| r == user_id)
    }

    /// Flag value the reviewer count calls for
    pub fn expected_need_more_reviewers(&self) -> bool {
        self.reviewers.len() < REVIEWER_CAPACITY
    }
}

/// Pull request summary used for review listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    pub author_id: String,
    pub status: PrStatus,
}

/// Outcome of a successful reviewer swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

/// Slice of the author statistics to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index
    pub page: Option<u32>,
    /// Authors per page; `None` returns every author
    pub limit: Option<u32>,
}

impl Page {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page, limit }
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// Rows to skip before the slice starts
    pub fn offset(&self) -> u64 {
        match self.limit {
            Some(limit) => u64::from(self.page.unwrap_or(0)) * u64::from(limit),
            None => 0,
        }
    }
}

/// Merged pull requests per author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStatistics {
    #[serde(rename = "statistics")]
    pub counts_by_author: BTreeMap<String, u64>,
    /// Authors with at least one merged PR, regardless of page
    #[serde(rename = "count")]
    pub distinct_author_count: u64,
}

impl MergeStatistics {
    pub fn total_merged(&self) -> u64 {
        self.counts_by_author.values().sum()
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}
