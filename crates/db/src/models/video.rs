//! Video entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tflow_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub source_file_name: Option<String>,
    pub source_file_url: Option<String>,
    pub source_file_size_bytes: Option<i64>,
    pub source_file_content_type: Option<String>,
    pub translated_file_name: Option<String>,
    pub translated_file_url: Option<String>,
    pub translated_file_size_bytes: Option<i64>,
    pub translated_file_content_type: Option<String>,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a video under a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVideo {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub source_file_name: Option<String>,
    #[validate(url)]
    pub source_file_url: Option<String>,
    #[validate(range(min = 0))]
    pub source_file_size_bytes: Option<i64>,
    pub source_file_content_type: Option<String>,
}

/// DTO for updating a video. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVideo {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub status: Option<String>,
    pub source_file_name: Option<String>,
    #[validate(url)]
    pub source_file_url: Option<String>,
    #[validate(range(min = 0))]
    pub source_file_size_bytes: Option<i64>,
    pub source_file_content_type: Option<String>,
    pub translated_file_name: Option<String>,
    #[validate(url)]
    pub translated_file_url: Option<String>,
    #[validate(range(min = 0))]
    pub translated_file_size_bytes: Option<i64>,
    pub translated_file_content_type: Option<String>,
}
