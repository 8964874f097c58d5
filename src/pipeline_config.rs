//! Extraction configuration.
//!
//! Every table the lab extraction pipeline consults lives in one immutable
//! [`LabExtractionConfig`], built once and owned by the extractor. Tests swap
//! in fixture tables through [`LabExtractionConfig::new`].

use std::collections::HashSet;

use crate::config;
use crate::pipeline::lab_extraction::confidence::recognized_unit_set;
use crate::pipeline::lab_extraction::normalize::STOP_PHRASES;
use crate::pipeline::lab_extraction::{
    LabExtractionError, ParameterAliasTable, PatternLibrary, ReferenceTable, UnitAliasTable,
};

#[derive(Debug, Clone)]
pub struct LabExtractionConfig {
    pub patterns: PatternLibrary,
    pub units: UnitAliasTable,
    pub parameters: ParameterAliasTable,
    pub references: ReferenceTable,
    /// Lower-case phrases that disqualify a parameter label.
    pub stop_phrases: Vec<String>,
    /// Canonical units that earn the unit confidence bonus.
    pub recognized_units: HashSet<String>,
    /// Input beyond this many bytes is ignored.
    pub max_input_bytes: usize,
    /// Parameter labels shorter than this (in chars) are discarded.
    pub min_parameter_chars: usize,
}

impl LabExtractionConfig {
    pub fn new(
        patterns: PatternLibrary,
        units: UnitAliasTable,
        parameters: ParameterAliasTable,
        references: ReferenceTable,
    ) -> Self {
        Self {
            patterns,
            units,
            parameters,
            references,
            stop_phrases: STOP_PHRASES.iter().map(|s| s.to_string()).collect(),
            recognized_units: recognized_unit_set(),
            max_input_bytes: config::DEFAULT_MAX_INPUT_BYTES,
            min_parameter_chars: config::MIN_PARAMETER_CHARS,
        }
    }

    /// Built-in catalog: all specific and generic patterns, standard tables.
    pub fn standard() -> Result<Self, LabExtractionError> {
        Ok(Self::new(
            PatternLibrary::standard()?,
            UnitAliasTable::standard(),
            ParameterAliasTable::standard(),
            ReferenceTable::standard(),
        ))
    }

    /// [`Self::standard`] with the input cap taken from the environment.
    pub fn from_env() -> Result<Self, LabExtractionError> {
        Ok(Self::standard()?.with_max_input_bytes(config::max_input_bytes_from_env()))
    }

    pub fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    pub fn with_stop_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_phrases = phrases
            .into_iter()
            .map(|p| p.into().to_lowercase())
            .collect();
        self
    }
}
