//! Repository modules for database operations

pub mod pull_requests;
pub mod reviewers;
pub mod stats;
pub mod teams;

pub use pull_requests::PullRequestRepository;
pub use reviewers::ReviewerRepository;
pub use stats::StatsRepository;
pub use teams::{TeamRepository, UserRepository};
