//! Pagination integration tests: partition property, sentinels, ordering,
//! navigation links and tenant isolation.

mod common;

use std::collections::HashSet;

use serde_json::Value;

use pagefilter::{
    MemorySource, OrderDirection, PageError, PaginationQuery, Paginator, PaginatorConfig,
};

use common::*;

fn positions(items: &[Value]) -> Vec<u64> {
    items
        .iter()
        .map(|r| r["position"].as_u64().unwrap())
        .collect()
}

fn link_params(link: &str) -> Vec<(String, String)> {
    let (_, query) = link.split_once('?').unwrap();
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

// ─────────────────────── partition ───────────────────────

#[tokio::test]
async fn test_pages_partition_the_dataset() {
    let schema = schema();
    for n in [0usize, 1, 7, 10, 23] {
        let source = MemorySource::new(foods(group(), n));
        for per_page in [1i64, 3, 10, 50] {
            let mut seen = Vec::new();
            let first = page(
                &schema,
                "ingredient_food",
                &source,
                &PaginationQuery::new(1, per_page).with_order("position", OrderDirection::Asc),
            )
            .await
            .unwrap();

            for p in 1..=first.total_pages {
                let query = PaginationQuery::new(p as i64, per_page)
                    .with_order("position", OrderDirection::Asc);
                let result = page(&schema, "ingredient_food", &source, &query)
                    .await
                    .unwrap();
                assert!(result.items.len() as i64 <= per_page);
                seen.extend(positions(&result.items));
            }

            let expected: Vec<u64> = (0..n as u64).collect();
            assert_eq!(seen, expected, "n={n} per_page={per_page}");
        }
    }
}

#[tokio::test]
async fn test_descending_partition_has_no_duplicates() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 25));

    let mut seen = Vec::new();
    for p in 1..=3 {
        let query = PaginationQuery::new(p, 10).with_order("createdAt", OrderDirection::Desc);
        let result = page(&schema, "ingredient_food", &source, &query)
            .await
            .unwrap();
        seen.extend(positions(&result.items));
    }

    let unique: HashSet<_> = seen.iter().collect();
    assert_eq!(unique.len(), 25);
    assert_eq!(seen, (0..25).rev().collect::<Vec<u64>>());
}

// ─────────────────────── sentinels ───────────────────────

#[tokio::test]
async fn test_unlimited_per_page() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 120));

    let result = page(
        &schema,
        "ingredient_food",
        &source,
        &PaginationQuery::new(1, -1),
    )
    .await
    .unwrap();
    assert_eq!(result.total, 120);
    assert_eq!(result.items.len(), 120);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.page, 1);
    assert_eq!(result.per_page, -1);
}

#[tokio::test]
async fn test_last_page_sentinel() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 23));
    let order = |q: PaginationQuery| q.with_order("position", OrderDirection::Asc);

    let last = page(&schema, "ingredient_food", &source, &order(PaginationQuery::new(-1, 5)))
        .await
        .unwrap();
    let explicit = page(
        &schema,
        "ingredient_food",
        &source,
        &order(PaginationQuery::new(last.total_pages as i64, 5)),
    )
    .await
    .unwrap();
    let everything = page(&schema, "ingredient_food", &source, &order(PaginationQuery::new(1, -1)))
        .await
        .unwrap();

    assert_eq!(last.page, 5);
    assert_eq!(last.items, explicit.items);
    assert_eq!(last.items.last(), everything.items.last());
    assert_eq!(positions(&last.items), vec![20, 21, 22]);
}

#[tokio::test]
async fn test_out_of_range_page_is_empty_not_error() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 8));

    let result = page(&schema, "ingredient_food", &source, &PaginationQuery::new(40, 5))
        .await
        .unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.total, 8);
    assert_eq!(result.total_pages, 2);
}

#[tokio::test]
async fn test_invalid_window_rejected() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 3));

    let err = page(&schema, "ingredient_food", &source, &PaginationQuery::new(0, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, PageError::InvalidWindow(_)));
    assert_eq!(err.status(), 400);
    assert!(!err.is_bad_filter());
}

// ─────────────────────── ordering ───────────────────────

#[tokio::test]
async fn test_default_order_is_id_descending() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 4));

    let result = page(&schema, "ingredient_food", &source, &PaginationQuery::default())
        .await
        .unwrap();
    assert_eq!(positions(&result.items), vec![3, 2, 1, 0]);
}

#[tokio::test]
async fn test_unknown_order_key() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 4));

    let query = PaginationQuery::default().with_order("flavour", OrderDirection::Asc);
    let err = page(&schema, "ingredient_food", &source, &query)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unknown_order_key");
}

#[tokio::test]
async fn test_configured_defaults_apply_to_parsed_query() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 5));
    let paginator = Paginator::new(&schema, "ingredient_food", &source).with_config(
        PaginatorConfig {
            default_per_page: 2,
            default_direction: OrderDirection::Asc,
            ..PaginatorConfig::default()
        },
    );

    let query = PaginationQuery::from_query_string("page=1").unwrap();
    let result = paginator
        .page_with_guides(group(), &query, "/foods")
        .await
        .unwrap();
    assert_eq!(result.per_page, 2);
    assert_eq!((result.total, result.total_pages), (5, 3));
    assert_eq!(positions(&result.items), vec![0, 1]);

    // the link leaves the defaults to the next request
    let next = link_params(result.next.as_deref().unwrap());
    assert_eq!(next, vec![("page".to_string(), "2".to_string())]);
}

#[tokio::test]
async fn test_order_across_relation() {
    let schema = schema();
    let recipes = [recipe(1, 2), recipe(2, 1), recipe(3, 3)];
    let source = MemorySource::new(
        recipes
            .iter()
            .enumerate()
            .map(|(i, r)| timeline_event(i as u128, r))
            .collect(),
    );

    let query = PaginationQuery::new(1, -1).with_order("recipe.user.fullName", OrderDirection::Asc);
    let result = page(&schema, "timeline_event", &source, &query)
        .await
        .unwrap();
    assert_eq!(field(&result.items, "subject"), vec!["event 1", "event 0", "event 2"]);
}

// ─────────────────────── links ───────────────────────

#[tokio::test]
async fn test_links_preserve_parameters() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 30));
    let filter = format!(r#"createdAt >= "{}""#, base_time().to_rfc3339());
    let query = PaginationQuery::new(2, 7)
        .with_order("position", OrderDirection::Asc)
        .with_filter(filter.clone());

    let result = Paginator::new(&schema, "ingredient_food", &source)
        .page_with_guides(group(), &query, "/api/foods")
        .await
        .unwrap();

    let next = result.next.as_deref().unwrap();
    let previous = result.previous.as_deref().unwrap();
    assert!(next.starts_with("/api/foods?"));

    for (link, expected_page) in [(next, "3"), (previous, "1")] {
        let params = link_params(link);
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("page"), Some(expected_page));
        assert_eq!(get("perPage"), Some("7"));
        assert_eq!(get("orderBy"), Some("position"));
        assert_eq!(get("orderDirection"), Some("ASC"));
        assert_eq!(get("queryFilter"), Some(filter.as_str()));
    }
}

#[tokio::test]
async fn test_following_links_walks_every_page() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 11));
    let paginator = Paginator::new(&schema, "ingredient_food", &source);

    let mut query = PaginationQuery::new(1, 4).with_order("position", OrderDirection::Asc);
    let mut seen = Vec::new();
    loop {
        let result = paginator
            .page_with_guides(group(), &query, "/foods")
            .await
            .unwrap();
        seen.extend(positions(&result.items));
        let Some(next) = result.next else { break };
        let (_, qs) = next.split_once('?').unwrap();
        query = PaginationQuery::from_query_string(qs).unwrap();
    }
    assert_eq!(seen, (0..11).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_last_page_links() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 9));

    let result = Paginator::new(&schema, "ingredient_food", &source)
        .page_with_guides(group(), &PaginationQuery::new(-1, 3), "/foods")
        .await
        .unwrap();
    assert!(result.next.is_none());
    let previous = link_params(result.previous.as_deref().unwrap());
    assert!(previous.contains(&("page".to_string(), "2".to_string())));
}

// ─────────────────────── tenancy ───────────────────────

#[tokio::test]
async fn test_tenant_isolation() {
    let schema = schema();
    let mut records = foods(group(), 5);
    records.extend(foods(other_group(), 9));
    let source = MemorySource::new(records);

    let mine = page(&schema, "ingredient_food", &source, &PaginationQuery::new(1, -1))
        .await
        .unwrap();
    assert_eq!(mine.total, 5);

    let theirs = Paginator::new(&schema, "ingredient_food", &source)
        .page_all(other_group(), &PaginationQuery::new(1, -1))
        .await
        .unwrap();
    assert_eq!(theirs.total, 9);
    assert!(theirs
        .items
        .iter()
        .all(|r| r["group_id"] == other_group().to_string().as_str()));
}

#[tokio::test]
async fn test_result_serializes_for_transport() {
    let schema = schema();
    let source = MemorySource::new(foods(group(), 3));

    let result = page(&schema, "ingredient_food", &source, &PaginationQuery::new(1, 2))
        .await
        .unwrap()
        .map_items(|r| r["name"].as_str().unwrap_or_default().to_string());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["perPage"], 2);
    assert_eq!(json["items"][0], "food-002");
}
