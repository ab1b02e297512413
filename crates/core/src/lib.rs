//! Domain logic for TranslationFlow.
//!
//! Everything here is storage-agnostic: the workflow model, access rules,
//! language registry, error taxonomy, and small utilities shared by the
//! `db` and `api` crates.

pub mod access;
pub mod batch;
pub mod cache;
pub mod error;
pub mod languages;
pub mod project;
pub mod retry;
pub mod roles;
pub mod search;
pub mod types;
pub mod video;
pub mod workflow;
