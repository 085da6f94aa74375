//! Database layer for Roster
//!
//! SQLite persistence for teams, users, pull requests and reviewer links,
//! exposed to the engine through [`SqliteStore`].

pub mod connection;
pub mod error;
pub mod repos;
pub mod store;

pub use connection::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use store::{SqliteStore, SqliteTx};
