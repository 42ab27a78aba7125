//! pagefilter: filter expression compiler and pagination engine.
//!
//! A filter string is lexed and parsed into a [`FilterNode`] tree, resolved
//! against a [`SchemaGraph`], coerced into typed operands and compiled into a
//! backend-agnostic [`TypedPredicate`]. The [`Paginator`] hands that predicate
//! to a [`RecordSource`] and assembles a [`PaginationResult`] with navigation
//! links.

pub mod coerce;
pub mod error;
pub mod filter;
pub mod memory;
pub mod pagination;
pub mod paginator;
pub mod predicate;
pub mod resolver;
pub mod schema;

pub use coerce::{coerce, TypedValue};
pub use error::{
    FilterError, FilterErrorKind, FilterResult, PageError, PageResult, SchemaError,
};
pub use filter::{parse, Combinator, ComparisonOp, FilterNode};
pub use memory::MemorySource;
pub use pagination::{OrderDirection, PaginationQuery, PaginationResult};
pub use paginator::{OrderBy, Paginator, PaginatorConfig, RecordSource, TenantScope};
pub use predicate::{compile, compile_filter, TypedComparison, TypedPredicate};
pub use resolver::{resolve_path, ResolvedPath};
pub use schema::{EntitySchema, SchemaGraph, SemanticType};
