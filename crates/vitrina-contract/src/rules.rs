//! Gate rule sources: which semantic types have a gating rule.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use vitrina_core::gate;

use crate::error::{ContractError, ContractResult};

/// Pattern of a rule declaration in gate source text.
pub const RULE_DECLARATION_PATTERN: &str = r#"semantic_type:\s*"([^"]+)""#;

/// Set of semantic types with a gating rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// The rule table compiled into this binary.
    Builtin,
    /// Rule keys scanned from a gate source file.
    Scanned(BTreeSet<String>),
}

impl RuleSource {
    /// Scan gate source text for rule declarations.
    pub fn from_source(text: &str) -> ContractResult<Self> {
        let pattern = Regex::new(RULE_DECLARATION_PATTERN)
            .map_err(|e| ContractError::InvalidGateSource(e.to_string()))?;
        let keys: BTreeSet<String> = pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_lowercase())
            .filter(|key| !key.is_empty())
            .collect();

        if keys.is_empty() {
            return Err(ContractError::InvalidGateSource(
                "no rule declarations found".to_string(),
            ));
        }
        debug!(rule_count = keys.len(), "Scanned gate source");
        Ok(Self::Scanned(keys))
    }

    pub fn from_file(path: &Path) -> ContractResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&text)
    }

    /// Rule keys, sorted.
    pub fn keys(&self) -> BTreeSet<String> {
        match self {
            RuleSource::Builtin => gate::gated_semantic_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            RuleSource::Scanned(keys) => keys.clone(),
        }
    }

    pub fn covers(&self, semantic_type: &str) -> bool {
        match self {
            RuleSource::Builtin => gate::rule_for(semantic_type).is_some(),
            RuleSource::Scanned(keys) => keys.contains(semantic_type),
        }
    }
}
