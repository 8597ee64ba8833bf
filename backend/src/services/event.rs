//! Event management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::{validate_name, Event};

/// Event service
#[derive(Clone)]
pub struct EventService {
    db: PgPool,
}

/// Database row for an event
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    name: String,
    time: DateTime<Utc>,
    created_by_id: Option<i64>,
    restaurant_id: Option<i64>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            time: row.time,
            created_by_id: row.created_by_id,
            restaurant_id: row.restaurant_id,
        }
    }
}

/// Input for creating an event
#[derive(Debug, Deserialize)]
pub struct CreateEventInput {
    pub name: String,
    pub time: DateTime<Utc>,
    pub created_by_id: Option<i64>,
    pub restaurant_id: Option<i64>,
}

/// Input for updating an event
#[derive(Debug, Deserialize)]
pub struct UpdateEventInput {
    pub name: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub created_by_id: Option<Option<i64>>,
    pub restaurant_id: Option<Option<i64>>,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all events, soonest first
    pub async fn list_events(&self) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, time, created_by_id, restaurant_id FROM event ORDER BY time ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Get an event by id
    pub async fn get_event(&self, event_id: i64) -> AppResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, time, created_by_id, restaurant_id FROM event WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".to_string()))?;

        Ok(row.into())
    }

    /// Create an event
    pub async fn create_event(&self, input: CreateEventInput) -> AppResult<Event> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(user_id) = input.created_by_id {
            self.ensure_user_exists(user_id).await?;
        }
        if let Some(restaurant_id) = input.restaurant_id {
            self.ensure_restaurant_exists(restaurant_id).await?;
        }

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO event (name, time, created_by_id, restaurant_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, time, created_by_id, restaurant_id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.time)
        .bind(input.created_by_id)
        .bind(input.restaurant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update an event
    pub async fn update_event(&self, event_id: i64, input: UpdateEventInput) -> AppResult<Event> {
        let existing = self.get_event(event_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let time = input.time.unwrap_or(existing.time);
        let created_by_id = input.created_by_id.unwrap_or(existing.created_by_id);
        let restaurant_id = input.restaurant_id.unwrap_or(existing.restaurant_id);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(user_id) = created_by_id {
            self.ensure_user_exists(user_id).await?;
        }
        if let Some(restaurant_id) = restaurant_id {
            self.ensure_restaurant_exists(restaurant_id).await?;
        }

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE event
            SET name = $1, time = $2, created_by_id = $3, restaurant_id = $4
            WHERE id = $5
            RETURNING id, name, time, created_by_id, restaurant_id
            "#,
        )
        .bind(name.trim())
        .bind(time)
        .bind(created_by_id)
        .bind(restaurant_id)
        .bind(event_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete an event
    pub async fn delete_event(&self, event_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM event WHERE id = $1")
            .bind(event_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event".to_string()));
        }

        Ok(())
    }

    async fn ensure_user_exists(&self, user_id: i64) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }

    async fn ensure_restaurant_exists(&self, restaurant_id: i64) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM restaurant WHERE id = $1)")
                .bind(restaurant_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Restaurant".to_string()));
        }

        Ok(())
    }
}
