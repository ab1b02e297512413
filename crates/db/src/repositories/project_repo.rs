//! Repository for the `projects` and `project_phases` tables.

use sqlx::PgPool;
use tflow_core::error::CoreError;
use tflow_core::search::like_pattern;
use tflow_core::types::DbId;
use tflow_core::workflow::{apply_status_change, first_phase, Phase, PhaseStatus, PHASE_SEQUENCE};

use crate::models::project::{
    decode_phases, CreateProject, PhaseStatusUpdate, Project, ProjectFilter, ProjectPhase,
    ProjectSummary, ProjectWithPhases, UpdateProject,
};
use crate::repositories::VideoRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, source_language, target_languages, \
    current_phase, created_by, owner_id, created_at, updated_at";

/// Same columns qualified with the `p` alias, for queries with subselects.
const P_COLUMNS: &str = "p.id, p.name, p.description, p.source_language, p.target_languages, \
    p.current_phase, p.created_by, p.owner_id, p.created_at, p.updated_at";

const PHASE_COLUMNS: &str = "project_id, phase, status, assignee_id, updated_at";

fn decode_error(err: CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Provides CRUD and workflow operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project owned by its creator, together with one
    /// `not_started` row per workflow phase.
    ///
    /// Languages in `input` are expected to be validated and canonical.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateProject,
    ) -> Result<ProjectWithPhases, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects
                (name, description, source_language, target_languages,
                 current_phase, created_by, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.source_language)
            .bind(&input.target_languages)
            .bind(first_phase().as_str())
            .bind(creator_id)
            .fetch_one(&mut *tx)
            .await?;

        let phase_names: Vec<&str> = PHASE_SEQUENCE.iter().map(|p| p.as_str()).collect();
        let query = format!(
            "INSERT INTO project_phases (project_id, phase, status)
             SELECT $1, phase, $3 FROM UNNEST($2::TEXT[]) AS phase
             RETURNING {PHASE_COLUMNS}"
        );
        let phases = sqlx::query_as::<_, ProjectPhase>(&query)
            .bind(project.id)
            .bind(&phase_names)
            .bind(PhaseStatus::NotStarted.as_str())
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ProjectWithPhases { project, phases })
    }

    /// Find a project row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project with all of its phase rows.
    pub async fn find_with_phases(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectWithPhases>, sqlx::Error> {
        let Some(project) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let phases = Self::list_phases(pool, &[id]).await?;
        Ok(Some(ProjectWithPhases { project, phases }))
    }

    /// Phase rows for a set of projects.
    pub async fn list_phases(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<ProjectPhase>, sqlx::Error> {
        let query = format!(
            "SELECT {PHASE_COLUMNS} FROM project_phases
             WHERE project_id = ANY($1)
             ORDER BY project_id, phase"
        );
        sqlx::query_as::<_, ProjectPhase>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Projects the user owns, created, or is assigned to in any phase,
    /// most recently updated first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS} FROM projects p
             WHERE (p.owner_id = $1 OR p.created_by = $1 OR EXISTS (
                    SELECT 1 FROM project_phases pp
                    WHERE pp.project_id = p.id AND pp.assignee_id = $1))
               AND ($2::TEXT IS NULL OR p.current_phase = $2)
               AND ($3::TEXT IS NULL OR p.name ILIKE $3 OR p.description ILIKE $3)
             ORDER BY p.updated_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(filter.phase.map(Phase::as_str))
            .bind(like_pattern(filter.search.as_deref()))
            .fetch_all(pool)
            .await
    }

    /// All projects, for administrators.
    pub async fn list_all(
        pool: &PgPool,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::TEXT IS NULL OR current_phase = $1)
               AND ($2::TEXT IS NULL OR name ILIKE $2 OR description ILIKE $2)
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(filter.phase.map(Phase::as_str))
            .bind(like_pattern(filter.search.as_deref()))
            .fetch_all(pool)
            .await
    }

    /// Build dashboard summaries for a list of projects with one phase query.
    pub async fn summaries(
        pool: &PgPool,
        projects: &[Project],
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let ids: Vec<DbId> = projects.iter().map(|p| p.id).collect();
        let phases = Self::list_phases(pool, &ids).await?;
        projects
            .iter()
            .map(|p| ProjectSummary::from_rows(p, &phases).map_err(decode_error))
            .collect()
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                source_language = COALESCE($4, source_language),
                target_languages = COALESCE($5, target_languages),
                owner_id = COALESCE($6, owner_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.source_language)
            .bind(&input.target_languages)
            .bind(input.owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project, its phase rows, and all of its videos.
    ///
    /// Videos go first in bounded batches; everything happens in one
    /// transaction. Returns `None` if the project does not exist, else the
    /// number of videos removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let videos = VideoRepo::delete_for_project(&mut *tx, id).await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(videos))
    }

    /// Change one phase's status, moving the project's current phase along
    /// with it.
    ///
    /// The project row is locked for the duration so concurrent changes are
    /// applied one at a time against fresh state.
    pub async fn set_phase_status(
        pool: &PgPool,
        id: DbId,
        phase: Phase,
        status: PhaseStatus,
    ) -> Result<PhaseStatusUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        let Some(project) = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(PhaseStatusUpdate::ProjectNotFound);
        };

        let query = format!("SELECT {PHASE_COLUMNS} FROM project_phases WHERE project_id = $1");
        let rows = sqlx::query_as::<_, ProjectPhase>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let (phases, _) = decode_phases(&rows).map_err(decode_error)?;
        let current: Phase = project.current_phase.parse().map_err(decode_error)?;

        let change = match apply_status_change(&phases, current, phase, status) {
            Ok(change) => change,
            Err(CoreError::Validation(msg)) => return Ok(PhaseStatusUpdate::Rejected(msg)),
            Err(other) => return Err(decode_error(other)),
        };

        sqlx::query(
            "INSERT INTO project_phases (project_id, phase, status)
             VALUES ($1, $2, $3)
             ON CONFLICT (project_id, phase) DO UPDATE SET status = EXCLUDED.status",
        )
        .bind(id)
        .bind(phase.as_str())
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE projects SET current_phase = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(change.current_phase.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PhaseStatusUpdate::Updated {
            previous_status: change.previous_status,
            current_phase: change.current_phase,
        })
    }

    /// Assign a phase to a user, or clear the assignment with `None`.
    ///
    /// Returns `false` if the project does not exist.
    pub async fn set_phase_assignee(
        pool: &PgPool,
        id: DbId,
        phase: Phase,
        user_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let touched = sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO project_phases (project_id, phase, status, assignee_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (project_id, phase) DO UPDATE SET assignee_id = EXCLUDED.assignee_id",
        )
        .bind(id)
        .bind(phase.as_str())
        .bind(PhaseStatus::NotStarted.as_str())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
