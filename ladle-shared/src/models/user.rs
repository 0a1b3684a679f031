/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing
/// accounts. Every domain entity (recipe, tag, ingredient) is owned by
/// exactly one user and is cascade-deleted with it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Email normalization
///
/// Emails are normalized before storage: the domain part is lowercased,
/// the local part is kept as typed. `Test2@Example.com` becomes
/// `Test2@example.com`. An empty email is rejected outright.
///
/// # Example
///
/// ```no_run
/// use ladle_shared::models::user::{User, CreateUser};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "cook@Example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         name: Some("Julia".to_string()),
///     },
/// )
/// .await?;
///
/// assert_eq!(user.email, "cook@example.com");
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Error type for user creation and updates
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email was empty or whitespace-only
    #[error("email address is required")]
    EmailRequired,

    /// Underlying database failure (includes unique violations)
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Normalized email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Whether the account may access staff-only surfaces
    pub is_staff: bool,

    /// Whether the account has every permission implicitly
    pub is_superuser: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (normalized before storage)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address (normalized before storage)
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New display name (use Some(None) to clear)
    pub name: Option<Option<String>>,

    /// Activate or deactivate the account
    pub is_active: Option<bool>,
}

/// Normalizes an email address for storage and lookup
///
/// Lowercases the domain part (after the last `@`) while preserving the
/// local part exactly as typed. Surrounding whitespace is trimmed. A value
/// without an `@` is returned trimmed but otherwise untouched.
///
/// # Example
///
/// ```
/// use ladle_shared::models::user::normalize_email;
///
/// assert_eq!(normalize_email("Test2@Example.com"), "Test2@example.com");
/// assert_eq!(normalize_email("TEST3@EXAMPLE.com"), "TEST3@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Validates and normalizes an email for a new or updated account.
fn prepare_email(email: &str) -> Result<String, UserError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(UserError::EmailRequired);
    }
    Ok(normalized)
}

impl User {
    /// Creates a new user in the database
    ///
    /// The email is normalized (domain lowercased) before insertion.
    /// Account flags start at their defaults: active, not staff, not
    /// superuser.
    ///
    /// # Errors
    ///
    /// - [`UserError::EmailRequired`] when the email is empty
    /// - [`UserError::Database`] for unique-constraint violations or
    ///   connection failures
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, UserError> {
        let email = prepare_email(&data.email)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, name, is_active, is_staff, is_superuser,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(email)
        .bind(data.password_hash)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Creates a superuser account
    ///
    /// Same as [`User::create`] but with `is_staff` and `is_superuser`
    /// both set. Used by operational tooling and tests, not by the
    /// public registration endpoint.
    pub async fn create_superuser(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<Self, UserError> {
        let email = prepare_email(email)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, TRUE, TRUE)
            RETURNING id, email, password_hash, name, is_active, is_staff, is_superuser,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, is_active, is_staff, is_superuser,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// The lookup value is normalized the same way stored emails are, so
    /// `User@EXAMPLE.COM` finds an account registered as `User@example.com`.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, is_active, is_staff, is_superuser,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed. Returns None when the user does not exist.
    ///
    /// # Errors
    ///
    /// - [`UserError::EmailRequired`] when an update sets an empty email
    /// - [`UserError::Database`] when the new email collides with another
    ///   account, or on connection failure
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, UserError> {
        let email = match data.email {
            Some(ref email) => Some(prepare_email(email)?),
            None => None,
        };

        // Build the UPDATE dynamically from the fields that are present.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, password_hash, name, is_active, is_staff, \
             is_superuser, created_at, updated_at, last_login_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(name_opt) = data.name {
            q = q.bind(name_opt);
        }
        if let Some(active) = data.is_active {
            q = q.bind(active);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Owned recipes, tags, and ingredients are removed by the ON DELETE
    /// CASCADE foreign keys. Returns false when the user did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the last login timestamp for a user
    ///
    /// Called after successful authentication.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
