//! Account store and notification sink over the application's tables.
//!
//! Measurements are read as text regardless of the column type so that the
//! numeric projection stays in one place (`ProfileRecord::snapshot`).

use async_trait::async_trait;
use fittrack_auth::{AccountStore, ProfileRecord, StoreResult, UserRecord};
use fittrack_notifications::{NewNotification, NotificationError, NotificationSink};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use uuid::Uuid;

use crate::error::PostgresError;

type UserRow = (String, String, Option<String>, Option<String>, Option<String>);

fn user_from_row(row: UserRow) -> UserRecord {
    let (id, email, name, image, password_hash) = row;
    UserRecord {
        id,
        email,
        name,
        image,
        password_hash,
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> = query_as(
            r#"
            SELECT "id", "email", "name", "image", "password"
            FROM "User"
            WHERE "email" = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(user_from_row))
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> = query_as(
            r#"
            SELECT "id", "email", "name", "image", "password"
            FROM "User"
            WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(user_from_row))
    }

    async fn find_profile_by_user_id(&self, user_id: &str) -> StoreResult<Option<ProfileRecord>> {
        let row: Option<(String, Option<String>, Option<String>)> = query_as(
            r#"
            SELECT "userId", "height"::text, "currentWeight"::text
            FROM "Profile"
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(|(user_id, height, current_weight)| ProfileRecord {
            user_id,
            height,
            current_weight,
        }))
    }
}

#[async_trait]
impl NotificationSink for PgStore {
    async fn create(&self, notification: NewNotification) -> Result<(), NotificationError> {
        query(
            r#"
            INSERT INTO "Notification" ("id", "userId", "title", "message", "type")
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.kind)
        .execute(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        tracing::debug!(user_id = %notification.user_id, kind = %notification.kind, "Notification stored");
        Ok(())
    }
}
