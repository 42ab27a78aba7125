//! Paginator: turns a query into one page of records from a record source.
//!
//! The paginator owns no data. It compiles the filter, resolves the order
//! key, asks the source for a count, computes the page window and asks the
//! source for that slice. Sorting and predicate evaluation belong to the
//! source.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PageError, PageResult};
use crate::pagination::{
    resolve_window, OrderDirection, PaginationQuery, PaginationResult, DEFAULT_PER_PAGE,
};
use crate::predicate::{compile_filter, TypedPredicate};
use crate::resolver::{resolve_path, ResolvedPath};
use crate::schema::SchemaGraph;

/// The caller's group. Every count and fetch is confined to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantScope(pub Uuid);

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TenantScope {
    fn from(id: Uuid) -> Self {
        TenantScope(id)
    }
}

/// A fully specified sort request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    pub path: ResolvedPath,
    pub direction: OrderDirection,
}

/// Storage backend able to count and slice filtered, ordered records.
///
/// Both operations must apply the predicate the same way, and `fetch` must
/// order by a key that is unique or stably tie-broken, or consecutive pages
/// may overlap.
#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Send;

    /// Number of records in `scope` matching `predicate` (`None` = all).
    async fn count(
        &self,
        scope: TenantScope,
        predicate: Option<&TypedPredicate>,
    ) -> anyhow::Result<u64>;

    /// `limit` records starting at `offset` under `order`.
    async fn fetch(
        &self,
        scope: TenantScope,
        predicate: Option<&TypedPredicate>,
        order: &OrderBy,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<Vec<Self::Record>>;
}

/// Paginator defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginatorConfig {
    pub default_per_page: i64,
    /// Order key used when the query names none. Caller-facing naming.
    pub default_order_by: String,
    pub default_direction: OrderDirection,
    /// Largest explicit `per_page` accepted. The unlimited sentinel is
    /// always allowed.
    pub max_per_page: Option<i64>,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            default_order_by: "id".to_string(),
            default_direction: OrderDirection::Desc,
            max_per_page: None,
        }
    }
}

/// Pages one entity of a schema graph out of a record source.
pub struct Paginator<'a, S> {
    schema: &'a SchemaGraph,
    entity: String,
    source: &'a S,
    config: PaginatorConfig,
}

impl<'a, S: RecordSource> Paginator<'a, S> {
    pub fn new(schema: &'a SchemaGraph, entity: impl Into<String>, source: &'a S) -> Self {
        Self {
            schema,
            entity: entity.into(),
            source,
            config: PaginatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PaginatorConfig) -> Self {
        self.config = config;
        self
    }

    /// `query` with its unset page size and direction taken from the config.
    fn effective(&self, query: &PaginationQuery) -> PaginationQuery {
        query.or_defaults(self.config.default_per_page, self.config.default_direction)
    }

    /// Validate the window and compile the filter and order key without
    /// touching the source.
    pub fn compile_query(
        &self,
        query: &PaginationQuery,
    ) -> PageResult<(Option<TypedPredicate>, OrderBy)> {
        let query = self.effective(query);
        query.validate(self.config.max_per_page)?;

        let predicate = query
            .filter()
            .map(|f| compile_filter(f, self.schema, &self.entity))
            .transpose()?;

        let key = query
            .order_by
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(self.config.default_order_by.as_str());
        let path = resolve_path(self.schema, &self.entity, key.trim()).map_err(|_| {
            PageError::UnknownOrderKey {
                key: key.to_string(),
                entity: self.entity.clone(),
            }
        })?;

        Ok((
            predicate,
            OrderBy {
                path,
                direction: query
                    .order_direction
                    .unwrap_or(self.config.default_direction),
            },
        ))
    }

    /// Fetch the page `query` describes.
    ///
    /// An out-of-range page yields empty items with the real totals.
    #[tracing::instrument(skip(self, query), fields(entity = %self.entity, tenant = %scope))]
    pub async fn page_all(
        &self,
        scope: TenantScope,
        query: &PaginationQuery,
    ) -> PageResult<PaginationResult<S::Record>> {
        let (predicate, order) = self.compile_query(query)?;
        let per_page = self
            .effective(query)
            .per_page
            .unwrap_or(self.config.default_per_page);

        let total = self
            .source
            .count(scope, predicate.as_ref())
            .await
            .map_err(PageError::Source)?;

        let window = resolve_window(query.page, per_page, total);
        tracing::debug!(
            page = window.page,
            offset = window.offset,
            limit = window.limit,
            total,
            total_pages = window.total_pages,
            order_by = %order.path,
            direction = %order.direction,
            "resolved page window"
        );

        let items = self
            .source
            .fetch(
                scope,
                predicate.as_ref(),
                &order,
                window.offset,
                window.limit,
            )
            .await
            .map_err(PageError::Source)?;

        Ok(PaginationResult {
            items,
            page: window.page,
            per_page,
            total,
            total_pages: window.total_pages,
            next: None,
            previous: None,
        })
    }

    /// [`page_all`](Self::page_all), then attach navigation links against `route`.
    pub async fn page_with_guides(
        &self,
        scope: TenantScope,
        query: &PaginationQuery,
        route: &str,
    ) -> PageResult<PaginationResult<S::Record>> {
        let mut result = self.page_all(scope, query).await?;
        result.set_pagination_guides(route, query);
        Ok(result)
    }
}
