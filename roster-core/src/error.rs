//! Error types for the review roster engine

use std::time::Duration;

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used by transports to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User, team, or pull request is absent
    NotFound,
    /// An identifier or unique name is already taken
    Conflict,
    /// The pull request is merged and its reviewers are frozen
    PrMerged,
    /// The given user is not a reviewer of the pull request
    NotReviewer,
    /// Nobody is left to take over a review
    NoCandidate,
    /// The request was rejected before reaching the store
    InvalidInput,
    /// Store failure, timeout, or misconfiguration
    Internal,
}

/// Error type for roster operations
#[derive(Error, Debug)]
pub enum Error {
    /// Author, reviewer, or member does not exist
    #[error("user {0} not found")]
    UserNotFound(String),

    /// No team with this name
    #[error("team {0} not found")]
    TeamNotFound(String),

    /// No pull request with this id
    #[error("pull request {0} not found")]
    PrNotFound(String),

    /// Pull request id already in use
    #[error("pull request {0} already exists")]
    PrAlreadyExists(String),

    /// Team name already in use
    #[error("team {0} already exists")]
    TeamAlreadyExists(String),

    /// A member's username belongs to another user
    #[error("username already exists: {0}")]
    UsernameAlreadyExists(String),

    /// Reviewers cannot change after merge
    #[error("cannot reassign on merged pull request {0}")]
    PrMerged(String),

    /// The user being replaced is not linked to the pull request
    #[error("user {user_id} is not a reviewer of pull request {pr_id}")]
    UserNotReviewerOfPr { pr_id: String, user_id: String },

    /// Candidate pool exhausted during reassignment
    #[error("no active replacement candidate for pull request {0}")]
    NoCandidatesToAssign(String),

    /// Request failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation exceeded its deadline and was rolled back
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any store-level failure
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Store(Box::new(err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UserNotFound(_) | Error::TeamNotFound(_) | Error::PrNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::PrAlreadyExists(_)
            | Error::TeamAlreadyExists(_)
            | Error::UsernameAlreadyExists(_) => ErrorKind::Conflict,
            Error::PrMerged(_) => ErrorKind::PrMerged,
            Error::UserNotReviewerOfPr { .. } => ErrorKind::NotReviewer,
            Error::NoCandidatesToAssign(_) => ErrorKind::NoCandidate,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Timeout(_) | Error::Store(_) | Error::Config(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for the boundary
    pub fn code(&self) -> &'static str {
        match self {
            Error::UserNotFound(_) | Error::TeamNotFound(_) | Error::PrNotFound(_) => "NOT_FOUND",
            Error::PrAlreadyExists(_) => "PR_EXISTS",
            Error::TeamAlreadyExists(_) => "TEAM_EXISTS",
            Error::UsernameAlreadyExists(_) => "USER_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::UserNotReviewerOfPr { .. } => "NOT_ASSIGNED",
            Error::NoCandidatesToAssign(_) => "NO_CANDIDATE",
            Error::InvalidInput(_) => "BAD_REQUEST",
            Error::Timeout(_) | Error::Store(_) | Error::Config(_) => "INTERNAL",
        }
    }

    /// Message safe to show a caller; internal failures carry no detail
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "internal error".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_codes_are_distinct() {
        let errors = [
            Error::PrMerged("pr-1".into()),
            Error::UserNotReviewerOfPr {
                pr_id: "pr-1".into(),
                user_id: "u1".into(),
            },
            Error::NoCandidatesToAssign("pr-1".into()),
            Error::Timeout(Duration::from_secs(1)),
        ];

        let codes: Vec<_> = errors.iter().map(Error::code).collect();
        assert_eq!(codes, ["PR_MERGED", "NOT_ASSIGNED", "NO_CANDIDATE", "INTERNAL"]);
    }

    #[test]
    fn test_not_found_variants_share_code() {
        assert_eq!(Error::UserNotFound("u".into()).code(), "NOT_FOUND");
        assert_eq!(Error::TeamNotFound("t".into()).code(), "NOT_FOUND");
        assert_eq!(Error::PrNotFound("p".into()).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = Error::store(std::io::Error::other("disk on fire at /var/lib/x"));
        assert!(err.is_internal());
        assert_eq!(err.public_message(), "internal error");
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_domain_errors_keep_message() {
        let err = Error::PrAlreadyExists("pr-1001".into());
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.public_message(), "pull request pr-1001 already exists");
    }
}
