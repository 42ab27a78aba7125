//! In-memory record source over JSON documents.
//!
//! Records are `serde_json::Value` objects. Relations are nested objects
//! (to-one) or arrays of objects (to-many). A comparison holds when any
//! value reached along its path satisfies it; a record with no value at
//! the path never matches, whatever the operator.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::coerce::{parse_bool, parse_datetime, parse_number, TypedValue};
use crate::pagination::OrderDirection;
use crate::paginator::{OrderBy, RecordSource, TenantScope};
use crate::predicate::{TypedComparison, TypedPredicate};
use crate::resolver::ResolvedPath;
use crate::schema::SemanticType;

pub const DEFAULT_TENANT_FIELD: &str = "group_id";

#[derive(Debug, Clone)]
pub struct MemorySource {
    records: Vec<Value>,
    tenant_field: String,
}

impl MemorySource {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            tenant_field: DEFAULT_TENANT_FIELD.to_string(),
        }
    }

    /// Load from a JSON array of records.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Top-level field holding each record's tenant id.
    pub fn with_tenant_field(mut self, field: impl Into<String>) -> Self {
        self.tenant_field = field.into();
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    fn in_scope(&self, record: &Value, scope: TenantScope) -> bool {
        record
            .get(&self.tenant_field)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            == Some(scope.0)
    }

    fn select(&self, scope: TenantScope, predicate: Option<&TypedPredicate>) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|r| self.in_scope(r, scope))
            .filter(|r| predicate.map_or(true, |p| matches(r, p)))
            .collect()
    }
}

/// Whether `record` satisfies `predicate`.
pub fn matches(record: &Value, predicate: &TypedPredicate) -> bool {
    predicate.evaluate(&mut |c: &TypedComparison| {
        values_at(record, &c.path)
            .into_iter()
            .filter_map(|v| typed(v, c.path.semantic_type))
            .any(|v| v.compare(&c.value).is_some_and(|o| c.op.accepts(o)))
    })
}

/// Every non-null value reached by `path`, flattening arrays on the way.
fn values_at<'v>(record: &'v Value, path: &ResolvedPath) -> Vec<&'v Value> {
    let segments: Vec<&str> = path.segments().collect();
    let mut out = Vec::new();
    collect(record, &segments, &mut out);
    out
}

fn collect<'v>(value: &'v Value, segments: &[&str], out: &mut Vec<&'v Value>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                collect(item, segments, out);
            }
        }
        Value::Object(map) => match segments.split_first() {
            Some((head, rest)) => {
                if let Some(next) = map.get(*head) {
                    collect(next, rest, out);
                }
            }
            None => out.push(value),
        },
        _ if segments.is_empty() => out.push(value),
        _ => {}
    }
}

/// Read a stored JSON value as `ty`. Unreadable values count as missing.
fn typed(value: &Value, ty: SemanticType) -> Option<TypedValue> {
    match (ty, value) {
        (SemanticType::String, Value::String(s)) => Some(TypedValue::String(s.clone())),
        (SemanticType::Number, Value::Number(n)) => n.as_f64().map(TypedValue::Number),
        (SemanticType::Number, Value::String(s)) => parse_number(s).map(TypedValue::Number),
        (SemanticType::Boolean, Value::Bool(b)) => Some(TypedValue::Boolean(*b)),
        (SemanticType::Boolean, Value::String(s)) => parse_bool(s).map(TypedValue::Boolean),
        (SemanticType::Uuid, Value::String(s)) => Uuid::parse_str(s).ok().map(TypedValue::Uuid),
        (SemanticType::DateTime, Value::String(s)) => {
            parse_datetime(s).map(TypedValue::DateTime)
        }
        _ => None,
    }
}

fn sort_key(record: &Value, path: &ResolvedPath) -> Option<TypedValue> {
    values_at(record, path)
        .into_iter()
        .find_map(|v| typed(v, path.semantic_type))
}

/// Ascending order with missing keys last.
fn compare_keys(a: &Option<TypedValue>, b: &Option<TypedValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    type Record = Value;

    async fn count(
        &self,
        scope: TenantScope,
        predicate: Option<&TypedPredicate>,
    ) -> anyhow::Result<u64> {
        Ok(self.select(scope, predicate).len() as u64)
    }

    async fn fetch(
        &self,
        scope: TenantScope,
        predicate: Option<&TypedPredicate>,
        order: &OrderBy,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<Vec<Value>> {
        let mut keyed: Vec<(Option<TypedValue>, &Value)> = self
            .select(scope, predicate)
            .into_iter()
            .map(|r| (sort_key(r, &order.path), r))
            .collect();

        // stable: equal keys keep insertion order in both directions
        keyed.sort_by(|(a, _), (b, _)| match order.direction {
            OrderDirection::Asc => compare_keys(a, b),
            OrderDirection::Desc => compare_keys(a, b).reverse(),
        });

        tracing::trace!(matched = keyed.len(), offset, limit, "memory fetch");
        Ok(keyed
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|(_, r)| r.clone())
            .collect())
    }
}
