//! Operand coercion: validates literal text against a resolved field type.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{FilterError, FilterResult};
use crate::schema::SemanticType;

/// A literal after successful coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum TypedValue {
    String(String),
    Number(f64),
    Boolean(bool),
    #[serde(rename = "UUID")]
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
}

impl TypedValue {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            TypedValue::String(_) => SemanticType::String,
            TypedValue::Number(_) => SemanticType::Number,
            TypedValue::Boolean(_) => SemanticType::Boolean,
            TypedValue::Uuid(_) => SemanticType::Uuid,
            TypedValue::DateTime(_) => SemanticType::DateTime,
        }
    }

    /// Order two values of the same type. `None` for mismatched types.
    ///
    /// Strings compare lexically and byte-wise, so `>` on a string field is
    /// a lexical comparison.
    pub fn compare(&self, other: &TypedValue) -> Option<Ordering> {
        match (self, other) {
            (TypedValue::String(a), TypedValue::String(b)) => Some(a.cmp(b)),
            (TypedValue::Number(a), TypedValue::Number(b)) => a.partial_cmp(b),
            (TypedValue::Boolean(a), TypedValue::Boolean(b)) => Some(a.cmp(b)),
            (TypedValue::Uuid(a), TypedValue::Uuid(b)) => Some(a.cmp(b)),
            (TypedValue::DateTime(a), TypedValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(v) => write!(f, "\"{v}\""),
            TypedValue::Number(v) => write!(f, "{v}"),
            TypedValue::Boolean(v) => write!(f, "{v}"),
            TypedValue::Uuid(v) => write!(f, "{v}"),
            TypedValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// Coerce literal text into a value of type `ty`.
pub fn coerce(ty: SemanticType, literal: &str) -> FilterResult<TypedValue> {
    let invalid = || FilterError::InvalidLiteral {
        expected: ty,
        literal: literal.to_string(),
    };

    match ty {
        SemanticType::String => Ok(TypedValue::String(literal.to_string())),
        SemanticType::Boolean => parse_bool(literal)
            .map(TypedValue::Boolean)
            .ok_or_else(invalid),
        SemanticType::Uuid => Uuid::parse_str(literal.trim())
            .map(TypedValue::Uuid)
            .map_err(|_| invalid()),
        SemanticType::DateTime => parse_datetime(literal)
            .map(TypedValue::DateTime)
            .ok_or_else(invalid),
        SemanticType::Number => parse_number(literal)
            .map(TypedValue::Number)
            .ok_or_else(invalid),
    }
}

/// `true`/`false`/`t`/`f`, any case.
pub fn parse_bool(literal: &str) -> Option<bool> {
    match literal.trim().to_ascii_lowercase().as_str() {
        "true" | "t" => Some(true),
        "false" | "f" => Some(false),
        _ => None,
    }
}

/// Integer or decimal literal: `[+-]?digits[.digits]`.
///
/// Rejects the extra spellings `f64::from_str` accepts (`inf`, `NaN`,
/// exponents, a bare `.5`).
pub fn parse_number(literal: &str) -> Option<f64> {
    let text = literal.trim();
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || frac_part.is_some_and(|f| !all_digits(f)) {
        return None;
    }
    text.parse().ok()
}

/// ISO-8601 timestamp. Offsets are normalised to UTC; timestamps without an
/// offset are taken as UTC; a bare date means midnight.
pub fn parse_datetime(literal: &str) -> Option<DateTime<Utc>> {
    let text = literal.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}
