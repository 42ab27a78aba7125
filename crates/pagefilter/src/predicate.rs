//! Predicate compiler: turns a parsed filter into a typed predicate tree.
//!
//! Each comparison leaf is resolved against the schema and its literal is
//! coerced to the field's type; logical nodes are rebuilt as-is. The first
//! error aborts compilation. Operators are not checked against the field
//! type, so `name > "b"` compiles and means whatever ordering the record
//! source gives strings.

use std::fmt;

use serde::Serialize;

use crate::coerce::{coerce, TypedValue};
use crate::error::FilterResult;
use crate::filter::{parse, Combinator, ComparisonOp, FilterNode};
use crate::resolver::{resolve_path, ResolvedPath};
use crate::schema::SchemaGraph;

/// A resolved, coerced comparison leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedComparison {
    pub path: ResolvedPath,
    pub op: ComparisonOp,
    pub value: TypedValue,
}

/// Backend-agnostic predicate handed to a record source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TypedPredicate {
    Comparison(TypedComparison),
    Logical {
        combinator: Combinator,
        left: Box<TypedPredicate>,
        right: Box<TypedPredicate>,
    },
}

impl TypedPredicate {
    /// Evaluate with standard two-valued logic, deciding each leaf with
    /// `leaf`. AND and OR short-circuit left to right.
    pub fn evaluate<F>(&self, leaf: &mut F) -> bool
    where
        F: FnMut(&TypedComparison) -> bool,
    {
        match self {
            TypedPredicate::Comparison(c) => leaf(c),
            TypedPredicate::Logical {
                combinator: Combinator::And,
                left,
                right,
            } => left.evaluate(leaf) && right.evaluate(leaf),
            TypedPredicate::Logical {
                combinator: Combinator::Or,
                left,
                right,
            } => left.evaluate(leaf) || right.evaluate(leaf),
        }
    }

    /// All comparison leaves, left to right.
    pub fn comparisons(&self) -> Vec<&TypedComparison> {
        let mut out = Vec::new();
        collect_comparisons(self, &mut out);
        out
    }
}

fn collect_comparisons<'a>(predicate: &'a TypedPredicate, out: &mut Vec<&'a TypedComparison>) {
    match predicate {
        TypedPredicate::Comparison(c) => out.push(c),
        TypedPredicate::Logical { left, right, .. } => {
            collect_comparisons(left, out);
            collect_comparisons(right, out);
        }
    }
}

impl fmt::Display for TypedPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedPredicate::Comparison(c) => write!(f, "{} {} {}", c.path, c.op, c.value),
            TypedPredicate::Logical {
                combinator,
                left,
                right,
            } => write!(f, "({left} {combinator} {right})"),
        }
    }
}

/// Compile a parsed filter against entity `root`.
pub fn compile(node: &FilterNode, schema: &SchemaGraph, root: &str) -> FilterResult<TypedPredicate> {
    match node {
        FilterNode::Comparison { path, op, literal } => {
            // resolution first: an unknown path wins over a bad literal
            let resolved = resolve_path(schema, root, path)?;
            let value = coerce(resolved.semantic_type, literal)?;
            Ok(TypedPredicate::Comparison(TypedComparison {
                path: resolved,
                op: *op,
                value,
            }))
        }
        FilterNode::Logical {
            combinator,
            left,
            right,
        } => Ok(TypedPredicate::Logical {
            combinator: *combinator,
            left: Box::new(compile(left, schema, root)?),
            right: Box::new(compile(right, schema, root)?),
        }),
    }
}

/// Parse and compile a filter string in one step.
pub fn compile_filter(input: &str, schema: &SchemaGraph, root: &str) -> FilterResult<TypedPredicate> {
    let result = parse(input).and_then(|node| compile(&node, schema, root));
    match &result {
        Ok(predicate) => tracing::debug!(entity = root, %predicate, "compiled filter"),
        Err(e) => tracing::warn!(entity = root, filter = input, code = e.code(), "rejected filter: {e}"),
    }
    result
}
