//! Attribute resolver: walks a dotted path through the schema graph.
//!
//! Every segment but the last must name a relation on the current entity;
//! the last must name a field. Incoming segments use the caller-facing
//! camelCase naming and are translated to the graph's snake_case names
//! before lookup.

use std::fmt;

use serde::Serialize;

use crate::error::{FilterError, FilterResult};
use crate::schema::{SchemaGraph, SemanticType};

/// A validated attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPath {
    /// Relation hops from the root entity, in internal naming.
    pub relations: Vec<String>,
    /// Terminal field, in internal naming.
    pub field: String,
    /// Entity that declares the terminal field.
    pub entity: String,
    pub semantic_type: SemanticType,
}

impl ResolvedPath {
    /// Segments from the root entity to the field.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relations
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.field.as_str()))
    }

    /// Dotted storage path, e.g. `recipe.user.id`.
    pub fn storage_path(&self) -> String {
        self.segments().collect::<Vec<_>>().join(".")
    }

    pub fn is_nested(&self) -> bool {
        !self.relations.is_empty()
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_path())
    }
}

/// Resolve `path` starting at entity `root`.
///
/// Failures name the entity in which resolution stopped, so
/// `group.preferences.badAttribute` reports the entity targeted by
/// `preferences`, not the root.
pub fn resolve_path(schema: &SchemaGraph, root: &str, path: &str) -> FilterResult<ResolvedPath> {
    let mut entity_name = root;
    let mut entity = schema
        .entity(root)
        .ok_or_else(|| FilterError::unknown_attribute(path, root))?;

    let segments: Vec<&str> = path.split('.').collect();
    let last = segments.len() - 1;
    let mut relations = Vec::with_capacity(last);

    for (i, segment) in segments.iter().enumerate() {
        let name = to_internal_name(segment)
            .ok_or_else(|| FilterError::unknown_attribute(path, entity_name))?;

        if i < last {
            let target = entity
                .relation(&name)
                .ok_or_else(|| FilterError::unknown_attribute(path, entity_name))?;
            entity = schema
                .entity(target)
                .ok_or_else(|| FilterError::unknown_attribute(path, target))?;
            entity_name = target;
            relations.push(name);
            continue;
        }

        let semantic_type = entity
            .field(&name)
            .ok_or_else(|| FilterError::unknown_attribute(path, entity_name))?;

        tracing::trace!(path, entity = entity_name, %semantic_type, "resolved attribute path");
        return Ok(ResolvedPath {
            relations,
            field: name,
            entity: entity_name.to_string(),
            semantic_type,
        });
    }

    // split() always yields at least one segment
    Err(FilterError::unknown_attribute(path, root))
}

/// Translate a caller-facing segment (`useAbbreviation`, `recipeID`) into
/// the internal naming (`use_abbreviation`, `recipe_id`).
///
/// Returns `None` when the segment cannot name anything: empty, leading
/// digit, or characters outside `[A-Za-z0-9_]`.
pub fn to_internal_name(segment: &str) -> Option<String> {
    let chars: Vec<char> = segment.chars().collect();
    match chars.first() {
        Some(c) if c.is_ascii_alphabetic() || *c == '_' => {}
        _ => return None,
    }
    if !chars.iter().all(|c| c.is_ascii_alphanumeric() || *c == '_') {
        return None;
    }

    let mut result = String::with_capacity(segment.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let starts_word = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if starts_word && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.push(c.to_ascii_lowercase());
    }
    Some(result)
}

/// Translate an internal snake_case name into caller-facing camelCase.
pub fn to_external_name(name: &str) -> String {
    let mut parts = name.split('_').filter(|p| !p.is_empty());
    let mut result = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.push(first.to_ascii_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}
