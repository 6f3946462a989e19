//! Facet gate: decides which filter controls and query parameters are legal.
//!
//! The schema is a capability manifest and the gate is a pure lookup against
//! it. Every semantic type the gate knows about has exactly one entry in
//! [`GATE_RULES`]; the contract checker enumerates that table to prove that
//! every semantic type a deployed schema declares is wired to a control.
//!
//! Visibility of a control and legality of its query parameters are derived
//! from the same rule, so they cannot drift apart: a parameter owned by a
//! hidden facet is stripped from the outgoing query by [`gate_query`].
//!
//! # Example
//!
//! ```
//! use vitrina_core::gate::{is_control_visible, FacetSet};
//! use vitrina_core::{Domain, FacetDefinition, FacetSchema, FacetType, ProductType};
//!
//! let schema = FacetSchema::new(Domain::Services, "acme")
//!     .with_facet(FacetDefinition::new("duration", FacetType::Range));
//! let facets = FacetSet::from_schema(&schema);
//!
//! assert!(is_control_visible("duration", &facets, ProductType::Service));
//! assert!(!is_control_visible("duration", &facets, ProductType::Good));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{BrowseQuery, FacetSchema, ProductType};

// =============================================================================
// RULE TABLE
// =============================================================================

/// Predicate deciding when a rule's control is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible whenever the schema declares the facet.
    SchemaPresence,
    /// Visible only when the schema declares the facet and the product type
    /// filter is `service`.
    ServiceOnly,
}

/// Control rendered for a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// Min/max numeric inputs.
    RangeInput,
    /// Single-choice select.
    Select,
}

/// One entry of the gate's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateRule {
    pub semantic_type: &'static str,
    pub control: ControlKind,
    /// Query parameters owned by this facet.
    pub params: &'static [&'static str],
    pub visibility: Visibility,
}

impl GateRule {
    fn is_satisfied(&self, facets: &FacetSet, product_type: ProductType) -> bool {
        if !facets.contains(self.semantic_type) {
            return false;
        }
        match self.visibility {
            Visibility::SchemaPresence => true,
            Visibility::ServiceOnly => product_type == ProductType::Service,
        }
    }
}

/// Gating rules, one per semantic facet type.
///
/// Table order is the order controls are presented in.
pub const GATE_RULES: &[GateRule] = &[
    GateRule {
        semantic_type: "category",
        control: ControlKind::Select,
        params: &["category"],
        visibility: Visibility::SchemaPresence,
    },
    GateRule {
        semantic_type: "brand",
        control: ControlKind::Select,
        params: &["brand"],
        visibility: Visibility::SchemaPresence,
    },
    GateRule {
        semantic_type: "location",
        control: ControlKind::Select,
        params: &["city"],
        visibility: Visibility::SchemaPresence,
    },
    GateRule {
        semantic_type: "price",
        control: ControlKind::RangeInput,
        params: &["min_price", "max_price"],
        visibility: Visibility::SchemaPresence,
    },
    GateRule {
        semantic_type: "duration",
        control: ControlKind::RangeInput,
        params: &["min_duration", "max_duration"],
        visibility: Visibility::ServiceOnly,
    },
];

/// Query parameters that no facet owns; always legal to send.
pub const UNGATED_PARAMS: &[&str] = &["query", "type", "sort", "page", "per_page", "lang"];

/// Look up the rule for a semantic type.
pub fn rule_for(semantic_type: &str) -> Option<&'static GateRule> {
    GATE_RULES.iter().find(|r| r.semantic_type == semantic_type)
}

/// Semantic types covered by the rule table.
pub fn gated_semantic_types() -> BTreeSet<&'static str> {
    GATE_RULES.iter().map(|r| r.semantic_type).collect()
}

// =============================================================================
// FACET SET
// =============================================================================

/// Applicable semantic facets derived from a schema.
///
/// An empty set is the fail-closed state used when no schema is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSet(BTreeSet<String>);

impl FacetSet {
    /// No facets applicable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_schema(schema: &FacetSchema) -> Self {
        Self(applicable_facets(schema))
    }

    pub fn contains(&self, semantic_type: &str) -> bool {
        self.0.contains(semantic_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FacetSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// GATE OPERATIONS
// =============================================================================

/// Exactly the semantic types declared by the schema.
pub fn applicable_facets(schema: &FacetSchema) -> BTreeSet<String> {
    schema.semantic_types().map(str::to_string).collect()
}

/// Whether the control for `semantic_type` may be shown.
///
/// Semantic types without a gating rule have no control and are never visible.
pub fn is_control_visible(semantic_type: &str, facets: &FacetSet, product_type: ProductType) -> bool {
    rule_for(semantic_type).is_some_and(|rule| rule.is_satisfied(facets, product_type))
}

/// A control the rendering layer should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleControl {
    pub semantic_type: String,
    pub control: ControlKind,
    pub params: Vec<String>,
}

/// Visible controls in rule-table order.
pub fn visible_controls(facets: &FacetSet, product_type: ProductType) -> Vec<VisibleControl> {
    GATE_RULES
        .iter()
        .filter(|rule| rule.is_satisfied(facets, product_type))
        .map(|rule| VisibleControl {
            semantic_type: rule.semantic_type.to_string(),
            control: rule.control,
            params: rule.params.iter().map(|p| p.to_string()).collect(),
        })
        .collect()
}

/// Facet-owned query parameters that may be sent.
pub fn legal_params(facets: &FacetSet, product_type: ProductType) -> BTreeSet<&'static str> {
    GATE_RULES
        .iter()
        .filter(|rule| rule.is_satisfied(facets, product_type))
        .flat_map(|rule| rule.params.iter().copied())
        .collect()
}

/// Whether a query parameter may appear in the outgoing browse request.
pub fn is_param_legal(param: &str, facets: &FacetSet, product_type: ProductType) -> bool {
    if UNGATED_PARAMS.contains(&param) {
        return true;
    }
    GATE_RULES
        .iter()
        .find(|rule| rule.params.contains(&param))
        .is_some_and(|rule| rule.is_satisfied(facets, product_type))
}

/// Strip every parameter owned by a rule that is not satisfied.
pub fn gate_query(query: &BrowseQuery, facets: &FacetSet) -> BrowseQuery {
    let product_type = query.product_type;
    let mut gated = query.clone();

    for rule in GATE_RULES {
        if rule.is_satisfied(facets, product_type) {
            continue;
        }
        for param in rule.params {
            if !gated.clear_param(param) {
                warn!(
                    semantic_type = rule.semantic_type,
                    param = *param,
                    "Gate rule owns a parameter the query cannot clear"
                );
            }
        }
    }

    if gated != *query {
        debug!(
            product_type = %product_type,
            facet_count = facets.len(),
            "Dropped query values for hidden facets"
        );
    }
    gated
}
