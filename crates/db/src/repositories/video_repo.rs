//! Repository for the `videos` table.

use sqlx::{PgConnection, PgPool};
use tflow_core::batch;
use tflow_core::types::DbId;

use crate::models::video::{CreateVideo, UpdateVideo, Video};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, \
    source_file_name, source_file_url, source_file_size_bytes, source_file_content_type, \
    translated_file_name, translated_file_url, translated_file_size_bytes, \
    translated_file_content_type, status, created_by, created_at, updated_at";

/// Provides CRUD operations for videos. Every query is scoped to a project.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video with status `pending`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &CreateVideo,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (project_id, title, source_file_name, source_file_url,
                 source_file_size_bytes, source_file_content_type, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(project_id)
            .bind(input.title.trim())
            .bind(&input.source_file_name)
            .bind(&input.source_file_url)
            .bind(input.source_file_size_bytes)
            .bind(&input.source_file_content_type)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a video by ID within a project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's videos, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a video. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the video does not exist in the project.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title = COALESCE($3, title),
                status = COALESCE($4, status),
                source_file_name = COALESCE($5, source_file_name),
                source_file_url = COALESCE($6, source_file_url),
                source_file_size_bytes = COALESCE($7, source_file_size_bytes),
                source_file_content_type = COALESCE($8, source_file_content_type),
                translated_file_name = COALESCE($9, translated_file_name),
                translated_file_url = COALESCE($10, translated_file_url),
                translated_file_size_bytes = COALESCE($11, translated_file_size_bytes),
                translated_file_content_type = COALESCE($12, translated_file_content_type)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.status)
            .bind(&input.source_file_name)
            .bind(&input.source_file_url)
            .bind(input.source_file_size_bytes)
            .bind(&input.source_file_content_type)
            .bind(&input.translated_file_name)
            .bind(&input.translated_file_url)
            .bind(input.translated_file_size_bytes)
            .bind(&input.translated_file_content_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete a single video. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every video of a project in batches of at most
    /// [`batch::MAX_BATCH_SIZE`] rows, on the caller's connection.
    ///
    /// Run this inside the caller's transaction so a failing batch rolls
    /// back the earlier ones. Returns the number of rows removed.
    pub async fn delete_for_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM videos WHERE project_id = $1 ORDER BY id")
                .bind(project_id)
                .fetch_all(&mut *conn)
                .await?;

        let mut deleted = 0u64;
        for chunk in batch::chunks(&ids) {
            let result = sqlx::query("DELETE FROM videos WHERE id = ANY($1)")
                .bind(chunk)
                .execute(&mut *conn)
                .await?;
            deleted += result.rows_affected();
        }
        Ok(deleted)
    }

    /// Number of videos in a project.
    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }
}
