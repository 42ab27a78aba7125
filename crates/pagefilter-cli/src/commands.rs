//! Subcommand implementations. Each returns the JSON document to print.

use serde_json::{json, Value};
use uuid::Uuid;

use pagefilter::{
    compile_filter, FilterError, MemorySource, OrderDirection, PageError, PaginationQuery,
    PaginatorConfig, Paginator, SchemaGraph, TenantScope,
};

/// Options of the `page` subcommand. Unset options take the config defaults.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub entity: String,
    pub tenant: Uuid,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub filter: Option<String>,
    pub route: Option<String>,
}

impl PageRequest {
    pub fn to_query(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.unwrap_or(1),
            per_page: self.per_page,
            order_by: self.order_by.clone(),
            order_direction: self.order_direction,
            query_filter: self.filter.clone(),
        }
    }
}

/// Compile `filter` against `entity` and render the typed predicate.
pub fn check(schema: &SchemaGraph, entity: &str, filter: &str) -> Result<Value, FilterError> {
    let predicate = compile_filter(filter, schema, entity)?;
    Ok(json!({
        "entity": entity,
        "canonical": predicate.to_string(),
        "predicate": predicate,
    }))
}

/// Run the paginator over `source` and render the page.
pub async fn page(
    schema: &SchemaGraph,
    source: &MemorySource,
    config: PaginatorConfig,
    request: &PageRequest,
) -> Result<Value, PageError> {
    let query = request.to_query();
    let paginator = Paginator::new(schema, request.entity.as_str(), source).with_config(config);
    let scope = TenantScope(request.tenant);

    let result = match &request.route {
        Some(route) => paginator.page_with_guides(scope, &query, route).await?,
        None => paginator.page_all(scope, &query).await?,
    };
    serde_json::to_value(result).map_err(|e| PageError::Source(e.into()))
}

/// Error document printed instead of a result.
pub fn error_body(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

pub fn page_error_body(err: &PageError) -> Value {
    let mut body = error_body(err.code(), &err.to_string());
    body["error"]["status"] = json!(err.status());
    body
}
