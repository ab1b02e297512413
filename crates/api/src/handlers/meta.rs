//! Static reference data for clients: supported languages and the workflow.

use axum::Json;
use serde::Serialize;
use tflow_core::languages::{Language, LANGUAGES};
use tflow_core::roles::Role;
use tflow_core::workflow::{
    eligible_role_for_phase, valid_transitions, Phase, PhaseStatus, PHASE_SEQUENCE,
};

use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct PhaseInfo {
    pub phase: Phase,
    pub label: &'static str,
    pub position: usize,
    pub eligible_role: Role,
}

#[derive(Debug, Serialize)]
pub struct TransitionInfo {
    pub from: PhaseStatus,
    pub to: &'static [PhaseStatus],
}

#[derive(Debug, Serialize)]
pub struct WorkflowInfo {
    pub phases: Vec<PhaseInfo>,
    pub transitions: Vec<TransitionInfo>,
}

/// GET /api/v1/meta/languages
pub async fn languages() -> Json<DataResponse<&'static [Language]>> {
    Json(DataResponse { data: LANGUAGES })
}

/// GET /api/v1/meta/workflow
pub async fn workflow() -> Json<DataResponse<WorkflowInfo>> {
    let phases = PHASE_SEQUENCE
        .iter()
        .map(|&phase| PhaseInfo {
            phase,
            label: phase.label(),
            position: phase.position(),
            eligible_role: eligible_role_for_phase(phase),
        })
        .collect();

    let transitions = [
        PhaseStatus::NotStarted,
        PhaseStatus::InProgress,
        PhaseStatus::Completed,
    ]
    .into_iter()
    .map(|from| TransitionInfo {
        from,
        to: valid_transitions(from),
    })
    .collect();

    Json(DataResponse {
        data: WorkflowInfo {
            phases,
            transitions,
        },
    })
}
