//! Error types for filter compilation, schema loading and pagination.

use crate::schema::SemanticType;

/// Stable machine-readable error codes.
pub mod error_codes {
    pub const SYNTAX_ERROR: &str = "syntax_error";
    pub const UNKNOWN_ATTRIBUTE: &str = "unknown_attribute";
    pub const INVALID_LITERAL: &str = "invalid_literal";
    pub const INVALID_WINDOW: &str = "invalid_window";
    pub const INVALID_ORDER_DIRECTION: &str = "invalid_order_direction";
    pub const UNKNOWN_ORDER_KEY: &str = "unknown_order_key";
    pub const SOURCE_ERROR: &str = "source_error";
}

/// Which part of filter compilation rejected the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterErrorKind {
    Syntax,
    UnknownAttribute,
    InvalidLiteral,
}

/// A rejected filter expression. Always a caller error.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Malformed token stream or grammar violation.
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A path segment does not exist on the entity reached so far.
    #[error("Unknown attribute '{path}' on entity '{entity}'")]
    UnknownAttribute { path: String, entity: String },

    /// The literal does not parse as the resolved field's type.
    #[error("Invalid {expected} literal: '{literal}'")]
    InvalidLiteral {
        expected: SemanticType,
        literal: String,
    },
}

impl FilterError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        FilterError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn unknown_attribute(path: &str, entity: &str) -> Self {
        FilterError::UnknownAttribute {
            path: path.to_string(),
            entity: entity.to_string(),
        }
    }

    pub fn kind(&self) -> FilterErrorKind {
        match self {
            FilterError::Syntax { .. } => FilterErrorKind::Syntax,
            FilterError::UnknownAttribute { .. } => FilterErrorKind::UnknownAttribute,
            FilterError::InvalidLiteral { .. } => FilterErrorKind::InvalidLiteral,
        }
    }

    pub fn code(&self) -> &'static str {
        use error_codes::*;
        match self.kind() {
            FilterErrorKind::Syntax => SYNTAX_ERROR,
            FilterErrorKind::UnknownAttribute => UNKNOWN_ATTRIBUTE,
            FilterErrorKind::InvalidLiteral => INVALID_LITERAL,
        }
    }
}

/// Errors raised while loading or validating a schema graph.
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("Relation '{entity}.{relation}' targets undeclared entity '{target}'")]
    DanglingRelation {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("Schema JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a pagination request can fail with.
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    /// The filter string was rejected. Surfaced to callers as a bad request.
    #[error("Bad filter: {0}")]
    Filter(#[from] FilterError),

    /// `page` or `per_page` outside the allowed domain.
    #[error("Invalid pagination window: {0}")]
    InvalidWindow(String),

    #[error("Invalid order direction '{0}': expected ASC or DESC")]
    InvalidOrderDirection(String),

    #[error("Unknown order key '{key}' on entity '{entity}'")]
    UnknownOrderKey { key: String, entity: String },

    /// Failure reported by the record source, passed through unchanged.
    #[error(transparent)]
    Source(anyhow::Error),
}

impl PageError {
    pub fn is_bad_filter(&self) -> bool {
        matches!(self, PageError::Filter(_))
    }

    /// The filter error behind this page error, if any.
    pub fn filter_error(&self) -> Option<&FilterError> {
        match self {
            PageError::Filter(e) => Some(e),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        use error_codes::*;
        match self {
            PageError::Filter(e) => e.code(),
            PageError::InvalidWindow(_) => INVALID_WINDOW,
            PageError::InvalidOrderDirection(_) => INVALID_ORDER_DIRECTION,
            PageError::UnknownOrderKey { .. } => UNKNOWN_ORDER_KEY,
            PageError::Source(_) => SOURCE_ERROR,
        }
    }

    /// HTTP status a transport should answer with.
    pub fn status(&self) -> u16 {
        match self {
            PageError::Source(_) => 500,
            _ => 400,
        }
    }
}

/// Convenience result types.
pub type FilterResult<T> = Result<T, FilterError>;
pub type PageResult<T> = Result<T, PageError>;
