//! Category tree normalization.
//!
//! Flattens the hierarchical category tree into an indented option list for a
//! single-select control. Traversal is depth-first pre-order, siblings keep
//! the order the endpoint returned them in, and an inactive node prunes its
//! entire subtree.

use serde_json::Value;
use tracing::{trace, warn};

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::{CategoryNode, CategoryOption};

/// Decode a tree payload that is either an array of roots or a single root.
pub fn normalize_tree_payload(payload: Value) -> Result<Vec<CategoryNode>> {
    match payload {
        Value::Array(_) => Ok(serde_json::from_value(payload)?),
        Value::Object(_) => Ok(vec![serde_json::from_value(payload)?]),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::MalformedTree(format!(
            "expected array or object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flatten a forest into ordered select options.
///
/// Fails with [`Error::MalformedTree`] when nesting exceeds
/// [`defaults::MAX_CATEGORY_DEPTH`] or a node id repeats on its own ancestor
/// path.
pub fn flatten(roots: &[CategoryNode]) -> Result<Vec<CategoryOption>> {
    let mut options = Vec::new();
    let mut path: Vec<&str> = Vec::new();
    for root in roots {
        visit(root, 1, &mut path, &mut options)?;
    }
    Ok(options)
}

fn visit<'a>(
    node: &'a CategoryNode,
    depth: usize,
    path: &mut Vec<&'a str>,
    out: &mut Vec<CategoryOption>,
) -> Result<()> {
    if depth > defaults::MAX_CATEGORY_DEPTH {
        return Err(Error::MalformedTree(format!(
            "depth exceeds {} at '{}'",
            defaults::MAX_CATEGORY_DEPTH,
            node.slug
        )));
    }
    if !node.id.is_empty() && path.contains(&node.id.as_str()) {
        return Err(Error::MalformedTree(format!(
            "category '{}' appears on its own ancestor path",
            node.id
        )));
    }
    if !node.is_active {
        trace!(slug = %node.slug, depth, "Pruning inactive category subtree");
        return Ok(());
    }

    let level = depth as u32;
    if node.level != 0 && node.level != level {
        warn!(
            slug = %node.slug,
            declared_level = node.level,
            depth,
            "Category level disagrees with tree depth; using depth"
        );
    }

    out.push(CategoryOption {
        value: node.slug.clone(),
        label: format!(
            "{}{}",
            defaults::CATEGORY_INDENT.repeat(depth - 1),
            node.display_name()
        ),
        level,
    });

    path.push(&node.id);
    for child in &node.children {
        visit(child, depth + 1, path, out)?;
    }
    path.pop();
    Ok(())
}
