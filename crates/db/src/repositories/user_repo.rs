//! Repository for the `users` table.

use sqlx::PgPool;
use tflow_core::roles::{Role, ROLE_ADMIN};
use tflow_core::types::DbId;

use crate::models::user::{UpdateProfile, UpsertUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, external_id, email, display_name, is_validated, roles, \
    bio, skills, languages, created_at, updated_at";

/// Advisory lock key guarding first-admin bootstrap.
const ADMIN_BOOTSTRAP_LOCK_KEY: i64 = 0x7466_6c6f_7700_0001;

/// Provides profile and role operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by the identity provider's subject identifier.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the profile on first sign-in, or refresh the email on later
    /// ones. New profiles start unvalidated with only the `user` role; an
    /// existing display name is kept.
    pub async fn upsert(pool: &PgPool, input: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (external_id, email, display_name)
             VALUES ($1, $2, COALESCE($3, ''))
             ON CONFLICT (external_id) DO UPDATE SET email = EXCLUDED.email
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.external_id)
            .bind(&input.email)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Apply a self-service profile update. Only non-`None` fields are applied.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                skills = COALESCE($4, skills),
                languages = COALESCE($5, languages)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.display_name.as_deref().map(str::trim))
            .bind(&input.bio)
            .bind(&input.skills)
            .bind(&input.languages)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear a user's validated flag.
    pub async fn set_validated(
        pool: &PgPool,
        id: DbId,
        is_validated: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET is_validated = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(is_validated)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's roles. `roles` must already be normalized.
    pub async fn set_roles(
        pool: &PgPool,
        id: DbId,
        roles: &[String],
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET roles = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(roles)
            .fetch_optional(pool)
            .await
    }

    /// Page through users, optionally only those holding `role`.
    ///
    /// Every user implicitly holds `user`, so filtering on it matches all.
    /// Returns the page and the total number of matching users.
    pub async fn list(
        pool: &PgPool,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let role = role.filter(|r| *r != Role::User).map(Role::as_str);

        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR $1 = ANY(roles))
             ORDER BY created_at ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(role)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR $1 = ANY(roles))")
                .bind(role)
                .fetch_one(pool)
                .await?;

        Ok((users, total))
    }

    /// Validated users who may be assigned work needing `role`.
    /// Administrators qualify for every role.
    pub async fn list_eligible(pool: &PgPool, role: Role) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE is_validated AND ($1 = ANY(roles) OR $2 = ANY(roles))
             ORDER BY display_name ASC, id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role.as_str())
            .bind(ROLE_ADMIN)
            .fetch_all(pool)
            .await
    }

    /// Whether at least one administrator exists.
    pub async fn any_admin_exists(pool: &PgPool) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE $1 = ANY(roles))")
            .bind(ROLE_ADMIN)
            .fetch_one(pool)
            .await
    }

    /// Promote `id` to admin only if no administrator exists yet.
    ///
    /// Serialized with a transaction-scoped advisory lock so two concurrent
    /// bootstrap attempts cannot both succeed. Returns `None` if an admin
    /// already exists or the user does not.
    pub async fn initialize_first_admin(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_BOOTSTRAP_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE $1 = ANY(roles))")
                .bind(ROLE_ADMIN)
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            return Ok(None);
        }

        let query = format!(
            "UPDATE users SET roles = array_append(roles, $2), is_validated = true
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(ROLE_ADMIN)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Grant the admin role and mark the user validated.
    ///
    /// Idempotent: the role is not duplicated if already present.
    pub async fn promote_to_admin(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                roles = CASE WHEN $2 = ANY(roles) THEN roles ELSE array_append(roles, $2) END,
                is_validated = true
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(ROLE_ADMIN)
            .fetch_optional(pool)
            .await
    }
}
