//! CLI command implementations

pub mod pr;
pub mod stats;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use stats::StatsArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use roster_core::{Config, Engine};
use roster_db::{Database, DatabaseConfig, SqliteStore};
use serde::Serialize;

/// Open the configured database and wrap it in an engine
pub async fn open_engine(config: &Config) -> anyhow::Result<Engine<SqliteStore>> {
    let db = Database::open(DatabaseConfig::from(config.database.clone()))
        .await
        .map_err(roster_core::Error::from)?;
    Ok(Engine::with_config(db.store(), config.engine.clone()))
}

/// Print a result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// JSON error envelope written to stderr
pub fn error_body(err: &roster_core::Error) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": err.code(),
            "message": err.public_message(),
        }
    })
}
