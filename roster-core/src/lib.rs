//! Roster Core - reviewer assignment for team pull requests
//!
//! Keeps a bounded reviewer roster on every pull request as team membership
//! changes: picks reviewers when a PR opens, swaps one on request, cascades
//! reassignment when a member is deactivated, and freezes everything once a
//! PR is merged. Storage is reached only through the [`store`] traits.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use config::{Config, DatabaseSettings, EngineConfig};
pub use engine::Engine;
pub use error::{Error, ErrorKind, Result};
pub use models::{
    Member, MergeStatistics, NewPullRequest, NewTeam, Page, PrStatus, PullRequest,
    PullRequestShort, Reassignment, Team, TeamWithMembers, User, REVIEWER_CAPACITY,
};
pub use store::{PullRequestRow, Store, StoreTx};
