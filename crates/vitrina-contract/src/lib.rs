//! # vitrina-contract
//!
//! Closed-world completeness check between deployed facet schemas and the
//! facet gate: every semantic type a schema declares must have a gating rule,
//! otherwise the schema advertises a filter the UI can never render.

pub mod error;
pub mod pack;
pub mod rules;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use error::{ContractError, ContractResult};
pub use pack::SchemaPack;
pub use rules::RuleSource;

/// Outcome of a contract check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractReport {
    pub domains: Vec<String>,
    /// Declared semantic types across all domains, first-appearance order.
    pub facet_types: Vec<String>,
    pub rule_keys: Vec<String>,
    /// Declared types without a gating rule, first-appearance order.
    pub missing: Vec<String>,
}

impl ContractReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "domains:     {}", self.domains.join(", "));
        let _ = writeln!(out, "facet types: {}", self.facet_types.join(", "));
        let _ = writeln!(out, "gate rules:  {}", self.rule_keys.join(", "));
        if self.passed() {
            let _ = writeln!(out, "OK: every declared facet type has a gating rule");
        } else {
            for semantic_type in &self.missing {
                let _ = writeln!(out, "MISSING: {} has no gating rule", semantic_type);
            }
            let _ = writeln!(
                out,
                "FAILED: {} facet type(s) not wired to a control",
                self.missing.len()
            );
        }
        out
    }
}

/// Check every declared semantic type against the rule source.
pub fn check_contract(pack: &SchemaPack, rules: &RuleSource) -> ContractReport {
    let facet_types = pack.semantic_types();
    let missing: Vec<String> = facet_types
        .iter()
        .filter(|semantic_type| !rules.covers(semantic_type))
        .cloned()
        .collect();

    if missing.is_empty() {
        info!(facet_type_count = facet_types.len(), "Schema/UI contract satisfied");
    } else {
        warn!(missing = ?missing, "Schema declares facet types without gating rules");
    }

    ContractReport {
        domains: pack.domains().map(str::to_string).collect(),
        rule_keys: rules.keys().into_iter().collect(),
        facet_types,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(json: &str) -> SchemaPack {
        SchemaPack::from_json_str(json).unwrap()
    }

    #[test]
    fn test_known_types_pass() {
        let report = check_contract(
            &pack(
                r#"{
                    "goods": {"facets": [
                        {"semantic_type": "price"}, {"semantic_type": "category"},
                        {"semantic_type": "location"}, {"semantic_type": "brand"}
                    ]},
                    "services": {"facets": [
                        {"semantic_type": "category"}, {"semantic_type": "location"},
                        {"semantic_type": "duration"}, {"semantic_type": "price"}
                    ]}
                }"#,
            ),
            &RuleSource::Builtin,
        );
        assert!(report.passed());
        assert_eq!(report.domains, vec!["goods", "services"]);
    }

    #[test]
    fn test_unwired_type_reported() {
        let report = check_contract(
            &pack(r#"{"goods": {"facets": [{"semantic_type": "price"}, {"semantic_type": "warranty"}]}}"#),
            &RuleSource::Builtin,
        );
        assert!(!report.passed());
        assert_eq!(report.missing, vec!["warranty"]);
        assert!(report.render_text().contains("MISSING: warranty"));
    }

    #[test]
    fn test_missing_in_first_appearance_order() {
        let report = check_contract(
            &pack(
                r#"{
                    "services": {"facets": [{"semantic_type": "rating"}, {"semantic_type": "warranty"}]},
                    "goods": {"facets": [{"semantic_type": "warranty"}, {"semantic_type": "color"}]}
                }"#,
            ),
            &RuleSource::Builtin,
        );
        assert_eq!(report.missing, vec!["warranty", "color", "rating"]);
    }

    #[test]
    fn test_scanned_rules_used_instead_of_builtin() {
        let rules = RuleSource::from_source(r#"semantic_type: "warranty""#).unwrap();
        let report = check_contract(
            &pack(r#"{"goods": {"facets": [{"semantic_type": "warranty"}, {"semantic_type": "price"}]}}"#),
            &rules,
        );
        assert_eq!(report.missing, vec!["price"]);
        assert_eq!(report.rule_keys, vec!["warranty"]);
    }

    #[test]
    fn test_report_serializes() {
        let report = check_contract(
            &pack(r#"{"goods": {"facets": []}}"#),
            &RuleSource::Builtin,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["missing"], serde_json::json!([]));
        assert!(report.render_text().starts_with("domains:     goods"));
    }
}
