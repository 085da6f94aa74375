//! Team and user repository

use roster_core::{Member, Team, User};
use sqlx::SqliteConnection;

use crate::error::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: String,
    username: String,
    team_name: String,
    is_active: bool,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            user_id: r.id,
            username: r.username,
            team_name: r.team_name,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MemberRecord {
    id: String,
    username: String,
    is_active: bool,
}

impl From<MemberRecord> for Member {
    fn from(r: MemberRecord) -> Self {
        Self {
            user_id: r.id,
            username: r.username,
            is_active: r.is_active,
        }
    }
}

/// Repository for teams and their members
pub struct TeamRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> TeamRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a team, failing with `DuplicateTeam` when the name is taken
    pub async fn create(&mut self, team: &Team) -> Result<()> {
        sqlx::query("INSERT INTO teams (id, name) VALUES (?, ?)")
            .bind(&team.id)
            .bind(&team.name)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| Error::unique_or(e, || Error::DuplicateTeam(team.name.clone())))?;
        Ok(())
    }

    pub async fn exists(&mut self, name: &str) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(found.is_some())
    }

    /// Members of the named team ordered by user id
    pub async fn members(&mut self, name: &str) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRecord>(
            r#"
            SELECT u.id, u.username, u.is_active
            FROM users u
            JOIN teams t ON t.id = u.team_id
            WHERE t.name = ?
            ORDER BY u.id
            "#,
        )
        .bind(name)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }
}

/// Repository for users
pub struct UserRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.username, t.name AS team_name, u.is_active
            FROM users u
            JOIN teams t ON t.id = u.team_id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row.map(User::from))
    }

    /// Insert each member into the team, or move and overwrite an existing user
    pub async fn upsert(&mut self, team_id: &str, members: &[Member]) -> Result<()> {
        for member in members {
            sqlx::query(
                r#"
                INSERT INTO users (id, username, team_id, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    username = excluded.username,
                    team_id = excluded.team_id,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(team_id)
            .bind(member.is_active)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| Error::unique_or(e, || Error::DuplicateUsername(member.username.clone())))?;
        }
        Ok(())
    }

    /// Returns false when the user does not exist
    pub async fn set_active(&mut self, user_id: &str, is_active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
