use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::session::SessionId;
use crate::users::repo_types::User;

impl User {
    /// Insert a new user bound to the given session.
    pub async fn create(db: &SqlitePool, name: &str, session: &SessionId) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, session_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(session.as_str())
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    /// Earliest user registered under a session. A browser that registers twice
    /// keeps resolving to its first user.
    pub async fn find_by_session(
        db: &SqlitePool,
        session: &SessionId,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, created_at
            FROM users
            WHERE session_id = ?
            ORDER BY created_at ASC, rowid ASC
            LIMIT 1
            "#,
        )
        .bind(session.as_str())
        .fetch_optional(db)
        .await
        .context("find user by session")?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn find_by_session_picks_first_registered_user() {
        let state = AppState::fake().await;
        let session = SessionId::mint();

        let first = User::create(&state.db, "first", &session).await.unwrap();
        User::create(&state.db, "second", &session).await.unwrap();

        let found = User::find_by_session(&state.db, &session)
            .await
            .unwrap()
            .expect("user for session");
        assert_eq!(found.id, first.id);
        assert_eq!(found.name, "first");
    }

    #[tokio::test]
    async fn find_by_unknown_session_is_none() {
        let state = AppState::fake().await;
        let found = User::find_by_session(&state.db, &SessionId::mint())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
