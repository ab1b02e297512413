//! Project entity model, phase rows, and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tflow_core::error::CoreError;
use tflow_core::types::{DbId, Timestamp};
use tflow_core::workflow::{
    compute_progress, phase_map_from_entries, NextAction, Phase, PhaseAssignments, PhaseMap,
    PhaseStatus,
};
use validator::Validate;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub current_phase: String,
    pub created_by: DbId,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `project_phases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectPhase {
    pub project_id: DbId,
    pub phase: String,
    pub status: String,
    pub assignee_id: Option<DbId>,
    pub updated_at: Timestamp,
}

/// A project with all of its phase rows.
#[derive(Debug, Clone)]
pub struct ProjectWithPhases {
    pub project: Project,
    pub phases: Vec<ProjectPhase>,
}

/// Project as returned by the API, with the workflow state decoded.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub current_phase: Phase,
    pub phases: PhaseMap,
    pub assignments: PhaseAssignments,
    pub progress: u8,
    pub created_by: DbId,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// What the requesting user should do next, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<NextAction>,
    /// Videos in the project; only filled in for single-project reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_count: Option<i64>,
}

/// Decode stored phase rows into status and assignment maps.
pub fn decode_phases(rows: &[ProjectPhase]) -> Result<(PhaseMap, PhaseAssignments), CoreError> {
    let phases = phase_map_from_entries(rows.iter().map(|r| (r.phase.as_str(), r.status.as_str())))?;
    let mut assignments = PhaseAssignments::new();
    for row in rows {
        if let Some(user_id) = row.assignee_id {
            assignments.insert(row.phase.parse()?, user_id);
        }
    }
    Ok((phases, assignments))
}

impl TryFrom<ProjectWithPhases> for ProjectDetail {
    type Error = CoreError;

    fn try_from(value: ProjectWithPhases) -> Result<Self, Self::Error> {
        let (phases, assignments) = decode_phases(&value.phases)?;
        let p = value.project;
        Ok(ProjectDetail {
            id: p.id,
            name: p.name,
            description: p.description,
            source_language: p.source_language,
            target_languages: p.target_languages,
            current_phase: p.current_phase.parse()?,
            progress: compute_progress(&phases),
            phases,
            assignments,
            created_by: p.created_by,
            owner_id: p.owner_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
            next_action: None,
            video_count: None,
        })
    }
}

/// Compact listing entry for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub current_phase: Phase,
    pub current_phase_status: PhaseStatus,
    pub progress: u8,
    pub owner_id: DbId,
    pub updated_at: Timestamp,
}

impl ProjectSummary {
    /// Build a summary from a project row and (any superset of) phase rows.
    pub fn from_rows(project: &Project, all_phases: &[ProjectPhase]) -> Result<Self, CoreError> {
        let own: Vec<ProjectPhase> = all_phases
            .iter()
            .filter(|r| r.project_id == project.id)
            .cloned()
            .collect();
        let (phases, _) = decode_phases(&own)?;
        let current_phase: Phase = project.current_phase.parse()?;
        Ok(ProjectSummary {
            id: project.id,
            name: project.name.clone(),
            source_language: project.source_language.clone(),
            target_languages: project.target_languages.clone(),
            current_phase,
            current_phase_status: phases
                .get(&current_phase)
                .copied()
                .unwrap_or(PhaseStatus::NotStarted),
            progress: compute_progress(&phases),
            owner_id: project.owner_id,
            updated_at: project.updated_at,
        })
    }
}

/// DTO for creating a project. The creator becomes the owner.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub source_language: String,
    #[validate(length(min = 1, max = 50))]
    pub target_languages: Vec<String>,
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub source_language: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub target_languages: Option<Vec<String>>,
    pub owner_id: Option<DbId>,
}

/// Request body for setting a phase's status.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPhaseStatus {
    pub status: PhaseStatus,
}

/// Request body for assigning a phase. `null` unassigns.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPhaseAssignee {
    pub user_id: Option<DbId>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    /// Only projects whose current phase is this one.
    pub phase: Option<Phase>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

/// Outcome of a phase status change.
#[derive(Debug, Clone)]
pub enum PhaseStatusUpdate {
    Updated {
        previous_status: PhaseStatus,
        current_phase: Phase,
    },
    ProjectNotFound,
    Rejected(String),
}
