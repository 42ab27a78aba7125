//! Shared fixtures for the pagefilter integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use pagefilter::{
    MemorySource, PageResult, PaginationQuery, PaginationResult, Paginator, SchemaGraph,
    SemanticType, TenantScope,
};

// ─────────────────────── tenants ───────────────────────

pub fn group() -> TenantScope {
    TenantScope(Uuid::from_u128(0x1000))
}

pub fn other_group() -> TenantScope {
    TenantScope(Uuid::from_u128(0x2000))
}

pub fn user_id(n: u128) -> Uuid {
    Uuid::from_u128(0x9000 + n)
}

// ─────────────────────── schema ───────────────────────

pub fn schema() -> SchemaGraph {
    SchemaGraph::builder()
        .entity("group", |e| {
            e.field("id", SemanticType::Uuid)
                .field("name", SemanticType::String)
                .relation("preferences", "group_preferences")
        })
        .entity("group_preferences", |e| {
            e.field("private_group", SemanticType::Boolean)
                .field("first_day_of_week", SemanticType::Number)
        })
        .entity("user", |e| {
            e.field("id", SemanticType::Uuid)
                .field("full_name", SemanticType::String)
                .relation("group", "group")
        })
        .entity("ingredient_unit", |e| {
            e.field("id", SemanticType::Uuid)
                .field("name", SemanticType::String)
                .field("abbreviation", SemanticType::String)
                .field("use_abbreviation", SemanticType::Boolean)
                .field("created_at", SemanticType::DateTime)
                .relation("group", "group")
        })
        .entity("ingredient_food", |e| {
            e.field("id", SemanticType::Uuid)
                .field("name", SemanticType::String)
                .field("position", SemanticType::Number)
                .field("created_at", SemanticType::DateTime)
        })
        .entity("recipe", |e| {
            e.field("id", SemanticType::Uuid)
                .field("name", SemanticType::String)
                .field("created_at", SemanticType::DateTime)
                .relation("user", "user")
        })
        .entity("timeline_event", |e| {
            e.field("id", SemanticType::Uuid)
                .field("subject", SemanticType::String)
                .field("created_at", SemanticType::DateTime)
                .relation("recipe", "recipe")
        })
        .build()
        .unwrap()
}

// ─────────────────────── records ───────────────────────

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 2, 22, 8, 0, 0).unwrap()
}

fn ts(offset_minutes: i64) -> String {
    (base_time() + Duration::minutes(offset_minutes)).to_rfc3339()
}

fn group_doc(scope: TenantScope) -> Value {
    json!({
        "id": scope.to_string(),
        "name": "home",
        "preferences": { "private_group": true, "first_day_of_week": 1 },
    })
}

/// Units created one minute apart, in order.
pub fn units() -> Vec<Value> {
    let spec = [
        ("test unit 1", "tu1", true),
        ("test unit 2", "tu2", false),
        ("test unit 3", "tu3", false),
    ];
    spec.iter()
        .enumerate()
        .map(|(i, (name, abbreviation, use_abbreviation))| {
            json!({
                "id": Uuid::from_u128(0x100 + i as u128).to_string(),
                "group_id": group().to_string(),
                "name": name,
                "abbreviation": abbreviation,
                "use_abbreviation": use_abbreviation,
                "created_at": ts(i as i64),
                "group": group_doc(group()),
            })
        })
        .collect()
}

pub fn unit_created_at(index: usize) -> String {
    ts(index as i64)
}

/// `n` foods for `scope`, with ascending `position` and `created_at`.
pub fn foods(scope: TenantScope, n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "id": Uuid::from_u128(0x10_0000 + i as u128).to_string(),
                "group_id": scope.to_string(),
                "name": format!("food-{i:03}"),
                "position": i,
                "created_at": ts(i as i64),
            })
        })
        .collect()
}

pub fn recipe(n: u128, user: u128) -> Value {
    json!({
        "id": Uuid::from_u128(0x5000 + n).to_string(),
        "group_id": group().to_string(),
        "name": format!("recipe {n}"),
        "created_at": ts(n as i64),
        "user": { "id": user_id(user).to_string(), "full_name": format!("user {user}") },
    })
}

pub fn timeline_event(n: u128, recipe_doc: &Value) -> Value {
    json!({
        "id": Uuid::from_u128(0x7000 + n).to_string(),
        "group_id": group().to_string(),
        "subject": format!("event {n}"),
        "created_at": ts(n as i64),
        "recipe": recipe_doc.clone(),
    })
}

// ─────────────────────── helpers ───────────────────────

pub async fn page(
    schema: &SchemaGraph,
    entity: &str,
    source: &MemorySource,
    query: &PaginationQuery,
) -> PageResult<PaginationResult<Value>> {
    Paginator::new(schema, entity, source)
        .page_all(group(), query)
        .await
}

/// Run `filter` over `entity` with everything on one page.
pub async fn filter_all(
    schema: &SchemaGraph,
    entity: &str,
    source: &MemorySource,
    filter: &str,
) -> PageResult<Vec<Value>> {
    let query = PaginationQuery::new(1, -1).with_filter(filter);
    Ok(page(schema, entity, source, &query).await?.items)
}

pub fn field<'a>(records: &'a [Value], name: &str) -> Vec<&'a str> {
    records.iter().filter_map(|r| r[name].as_str()).collect()
}
