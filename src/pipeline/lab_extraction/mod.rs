//! Lab-value extraction engine.
//!
//! Turns text recovered from a PDF lab report into typed candidate
//! measurements for human review:
//! ```text
//! sanitize → Matcher → Normalizer → ReferenceResolver → ConfidenceScorer → Deduplicator
//! ```
//! Pure and synchronous. Never fails on any input; degrades to fewer or
//! lower-confidence candidates instead.

pub mod types;
pub mod patterns;
pub mod matcher;
pub mod normalize;
pub mod reference;
pub mod confidence;
pub mod dedup;
pub mod sanitize;
pub mod orchestrator;

pub use types::*;
pub use patterns::{GroupRoles, PatternDef, PatternKind, PatternLibrary};
pub use normalize::UnitAliasTable;
pub use reference::{ParameterAliasTable, ParameterRule, ReferenceTable};
pub use confidence::thresholds;
pub use dedup::dedup_key;
pub use orchestrator::*;

use thiserror::Error;

/// Failures while building an extraction configuration. Extraction itself cannot fail.
#[derive(Error, Debug)]
pub enum LabExtractionError {
    #[error("Pattern '{id}' failed to compile: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern '{id}' role map references group {group}, but the pattern has {groups} groups")]
    InvalidRoleMap {
        id: String,
        group: usize,
        groups: usize,
    },

    #[error("Duplicate pattern id: {0}")]
    DuplicatePatternId(String),
}
