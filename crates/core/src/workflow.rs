//! The four-phase translation workflow.
//!
//! A project moves through [`PHASE_SEQUENCE`]: subtitle translation,
//! proofreading, audio production, and audio review. Each phase carries its
//! own [`PhaseStatus`] and an optional assignee. Status changes are checked
//! against an explicit transition table; sibling phases are never touched
//! by a change to one phase.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// A workflow phase. Variant order is the workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Translation,
    Proofreading,
    AudioProduction,
    AudioReview,
}

pub const PHASE_SEQUENCE: [Phase; 4] = [
    Phase::Translation,
    Phase::Proofreading,
    Phase::AudioProduction,
    Phase::AudioReview,
];

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Translation => "translation",
            Phase::Proofreading => "proofreading",
            Phase::AudioProduction => "audio_production",
            Phase::AudioReview => "audio_review",
        }
    }

    /// Human-readable label used in listings.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Translation => "Subtitle Translation",
            Phase::Proofreading => "Proofreading",
            Phase::AudioProduction => "Audio Production",
            Phase::AudioReview => "Audio Review",
        }
    }

    /// Zero-based position in [`PHASE_SEQUENCE`].
    pub fn position(self) -> usize {
        PHASE_SEQUENCE
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PHASE_SEQUENCE
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid phase '{s}'. Must be one of: {}",
                    PHASE_SEQUENCE.map(Phase::as_str).join(", ")
                ))
            })
    }
}

/// The first phase of every project.
pub fn first_phase() -> Phase {
    PHASE_SEQUENCE[0]
}

/// The successor of `phase`, or `None` for the last phase.
pub fn next_phase(phase: Phase) -> Option<Phase> {
    PHASE_SEQUENCE.get(phase.position() + 1).copied()
}

/// The role a user must hold to be assigned to `phase`.
pub fn eligible_role_for_phase(phase: Phase) -> Role {
    match phase {
        Phase::Translation => Role::Translator,
        Phase::Proofreading => Role::Reviewer,
        Phase::AudioProduction => Role::AudioProducer,
        Phase::AudioReview => Role::Reviewer,
    }
}

/// Like [`eligible_role_for_phase`] for a raw phase name; names outside the
/// sequence are admin-only.
pub fn eligible_role_for_phase_name(name: &str) -> Role {
    name.parse::<Phase>()
        .map(eligible_role_for_phase)
        .unwrap_or(Role::Admin)
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl PhaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseStatus::NotStarted => "not_started",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(PhaseStatus::NotStarted),
            "in_progress" => Ok(PhaseStatus::InProgress),
            "completed" => Ok(PhaseStatus::Completed),
            other => Err(CoreError::Validation(format!(
                "Invalid phase status '{other}'. Must be one of: not_started, in_progress, completed"
            ))),
        }
    }
}

/// Statuses reachable from `from` in one step.
///
/// - `not_started` -> `in_progress`
/// - `in_progress` -> `completed`, `not_started`
/// - `completed`   -> `in_progress` (reopen)
pub fn valid_transitions(from: PhaseStatus) -> &'static [PhaseStatus] {
    match from {
        PhaseStatus::NotStarted => &[PhaseStatus::InProgress],
        PhaseStatus::InProgress => &[PhaseStatus::Completed, PhaseStatus::NotStarted],
        PhaseStatus::Completed => &[PhaseStatus::InProgress],
    }
}

/// Validate a status change. Re-setting the current status is a no-op and
/// always allowed.
pub fn validate_transition(from: PhaseStatus, to: PhaseStatus) -> Result<(), CoreError> {
    if from == to || valid_transitions(from).contains(&to) {
        return Ok(());
    }
    Err(CoreError::Validation(format!(
        "Cannot transition phase from '{from}' to '{to}'. Allowed transitions: {:?}",
        valid_transitions(from)
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
    )))
}

// ---------------------------------------------------------------------------
// Phase maps
// ---------------------------------------------------------------------------

pub type PhaseMap = BTreeMap<Phase, PhaseStatus>;

/// Phase -> assigned user. A phase without an assignee has no entry.
pub type PhaseAssignments = BTreeMap<Phase, DbId>;

/// Every phase, `not_started`.
pub fn default_phases() -> PhaseMap {
    PHASE_SEQUENCE
        .iter()
        .map(|p| (*p, PhaseStatus::NotStarted))
        .collect()
}

/// Build a complete phase map from stored `(phase, status)` pairs.
///
/// Phases missing from `entries` are filled in as `not_started` so the
/// result always covers the whole sequence.
pub fn phase_map_from_entries<'a, I>(entries: I) -> Result<PhaseMap, CoreError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut map = default_phases();
    for (phase, status) in entries {
        map.insert(phase.parse()?, status.parse()?);
    }
    Ok(map)
}

/// Percentage of phases completed, rounded to the nearest integer.
/// An empty map is 0%.
pub fn compute_progress(phases: &PhaseMap) -> u8 {
    if phases.is_empty() {
        return 0;
    }
    let completed = phases
        .values()
        .filter(|s| **s == PhaseStatus::Completed)
        .count();
    ((completed as f64 / phases.len() as f64) * 100.0).round() as u8
}

/// Set or clear the assignee of `phase`. `None` removes the entry.
pub fn set_assignment(assignments: &mut PhaseAssignments, phase: Phase, user_id: Option<DbId>) {
    match user_id {
        Some(id) => {
            assignments.insert(phase, id);
        }
        None => {
            assignments.remove(&phase);
        }
    }
}

// ---------------------------------------------------------------------------
// Status changes
// ---------------------------------------------------------------------------

/// Result of applying a status change to a project's phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseChange {
    pub phases: PhaseMap,
    pub current_phase: Phase,
    pub previous_status: PhaseStatus,
}

/// Which phase is current after `phase` moved from `from` to `to`.
///
/// - setting a phase `in_progress` makes it current, even if it already
///   was in progress;
/// - completing the current phase advances to the next one (the last phase
///   stays current);
/// - anything else leaves the current phase alone.
pub fn resolve_current_phase(
    current: Phase,
    phase: Phase,
    from: PhaseStatus,
    to: PhaseStatus,
) -> Phase {
    match to {
        PhaseStatus::InProgress => phase,
        _ if from == to => current,
        PhaseStatus::Completed if phase == current => next_phase(phase).unwrap_or(phase),
        _ => current,
    }
}

/// Validate and apply a status change for one phase.
pub fn apply_status_change(
    phases: &PhaseMap,
    current_phase: Phase,
    phase: Phase,
    status: PhaseStatus,
) -> Result<PhaseChange, CoreError> {
    let previous_status = phases
        .get(&phase)
        .copied()
        .unwrap_or(PhaseStatus::NotStarted);
    validate_transition(previous_status, status)?;

    let mut updated = phases.clone();
    updated.insert(phase, status);

    Ok(PhaseChange {
        phases: updated,
        current_phase: resolve_current_phase(current_phase, phase, previous_status, status),
        previous_status,
    })
}

// ---------------------------------------------------------------------------
// Next action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseAction {
    Start,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextAction {
    pub phase: Phase,
    pub action: PhaseAction,
}

/// The first unfinished phase (in workflow order) assigned to `user_id`,
/// with the action that would move it forward.
pub fn next_action_for(
    phases: &PhaseMap,
    assignments: &PhaseAssignments,
    user_id: DbId,
) -> Option<NextAction> {
    PHASE_SEQUENCE.iter().find_map(|phase| {
        if assignments.get(phase) != Some(&user_id) {
            return None;
        }
        match phases.get(phase).copied().unwrap_or(PhaseStatus::NotStarted) {
            PhaseStatus::NotStarted => Some(NextAction {
                phase: *phase,
                action: PhaseAction::Start,
            }),
            PhaseStatus::InProgress => Some(NextAction {
                phase: *phase,
                action: PhaseAction::Complete,
            }),
            PhaseStatus::Completed => None,
        }
    })
}
