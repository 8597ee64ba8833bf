//! User management service
//!
//! Stores staff accounts with bcrypt-hashed passwords. Session handling and
//! authentication are outside this service; it only keeps the records.

use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::{validate_name, User};

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Database row for a user (hash stays internal)
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    login_id: String,
    name: String,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            login_id: row.login_id,
            name: row.name,
            role: row.role,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub login_id: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

/// Input for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub login_id: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, login_id, name, role FROM users ORDER BY login_id ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: i64) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, login_id, name, role FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(row.into())
    }

    /// Create a user
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        validate_name(&input.login_id).map_err(|msg| AppError::Validation {
            field: "login_id".to_string(),
            message: msg.to_string(),
        })?;
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_name(&input.role).map_err(|msg| AppError::Validation {
            field: "role".to_string(),
            message: msg.to_string(),
        })?;
        if input.password.len() < 8 {
            return Err(AppError::Validation {
                field: "password".to_string(),
                message: "Password must be at least 8 characters".to_string(),
            });
        }

        self.ensure_login_free(&input.login_id, None).await?;

        let password_hash = hash_password(&input.password)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (login_id, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, login_id, name, role
            "#,
        )
        .bind(input.login_id.trim())
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(input.role.trim())
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a user; the password is only rehashed when a new one is given
    pub async fn update_user(&self, user_id: i64, input: UpdateUserInput) -> AppResult<User> {
        let existing = self.get_user(user_id).await?;

        let login_id = input.login_id.unwrap_or(existing.login_id);
        let name = input.name.unwrap_or(existing.name);
        let role = input.role.unwrap_or(existing.role);

        validate_name(&login_id).map_err(|msg| AppError::Validation {
            field: "login_id".to_string(),
            message: msg.to_string(),
        })?;
        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_name(&role).map_err(|msg| AppError::Validation {
            field: "role".to_string(),
            message: msg.to_string(),
        })?;

        self.ensure_login_free(&login_id, Some(user_id)).await?;

        sqlx::query("UPDATE users SET login_id = $1, name = $2, role = $3 WHERE id = $4")
            .bind(login_id.trim())
            .bind(name.trim())
            .bind(role.trim())
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if let Some(password) = input.password {
            if password.len() < 8 {
                return Err(AppError::Validation {
                    field: "password".to_string(),
                    message: "Password must be at least 8 characters".to_string(),
                });
            }
            let password_hash = hash_password(&password)?;
            sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
                .bind(&password_hash)
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        self.get_user(user_id).await
    }

    /// Delete a user
    pub async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }

    async fn ensure_login_free(&self, login_id: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken_by = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE login_id = $1")
            .bind(login_id.trim())
            .fetch_optional(&self.db)
            .await?;

        if let Some(id) = taken_by {
            if Some(id) != exclude_id {
                return Err(AppError::Conflict {
                    resource: "user".to_string(),
                    message: "User with this login_id already exists".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}
