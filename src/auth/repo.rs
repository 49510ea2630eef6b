use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Workspace record; members are linked through user_workspaces.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Case-insensitive existence check. This is a fast-path courtesy only;
    /// the unique index on lower(email) is what holds under concurrency.
    pub async fn email_exists(db: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))
            "#,
        )
        .bind(email)
        .fetch_one(db)
        .await
    }

    /// Insert a new user, storing the email lower-cased.
    pub async fn create(
        conn: &mut PgConnection,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (lower($1), $2)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(conn)
        .await
    }
}

impl Workspace {
    pub async fn create(conn: &mut PgConnection, name: &str) -> Result<Workspace, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(conn)
        .await
    }

    pub async fn add_member(
        conn: &mut PgConnection,
        workspace_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_workspaces (user_id, workspace_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(workspace_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
