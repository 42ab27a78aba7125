//! Pagination query/result surface and page-window arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{PageError, PageResult};
use crate::resolver::{to_external_name, to_internal_name};

/// `page` sentinel meaning "the last page".
pub const LAST_PAGE: i64 = -1;
/// `per_page` sentinel meaning "everything on one page".
pub const UNLIMITED: i64 = -1;
pub const DEFAULT_PER_PAGE: i64 = 50;

// Query parameters, internal naming. Callers see them in camelCase.
const PAGE: &str = "page";
const PER_PAGE: &str = "per_page";
const ORDER_BY: &str = "order_by";
const ORDER_DIRECTION: &str = "order_direction";
const QUERY_FILTER: &str = "query_filter";
const PARAMETERS: [&str; 5] = [PAGE, PER_PAGE, ORDER_BY, ORDER_DIRECTION, QUERY_FILTER];

/// The pagination parameter `key` names, in either casing.
fn pagination_parameter(key: &str) -> Option<&'static str> {
    let internal = to_internal_name(key)?;
    PARAMETERS.into_iter().find(|p| *p == internal)
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[serde(alias = "asc")]
    Asc,
    #[default]
    #[serde(alias = "desc")]
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => f.write_str("ASC"),
            OrderDirection::Desc => f.write_str("DESC"),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(OrderDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(OrderDirection::Desc)
        } else {
            Err(PageError::InvalidOrderDirection(s.to_string()))
        }
    }
}

/// A pagination request as submitted by a caller.
///
/// Unset options take the paginator's configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationQuery {
    /// 1-based page number, or [`LAST_PAGE`].
    pub page: i64,
    /// Page size, or [`UNLIMITED`].
    pub per_page: Option<i64>,
    /// Caller-facing attribute path to sort by.
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub query_filter: Option<String>,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: None,
            order_by: None,
            order_direction: None,
            query_filter: None,
        }
    }
}

impl PaginationQuery {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.query_filter = Some(filter.into());
        self
    }

    pub fn with_order(mut self, order_by: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(order_by.into());
        self.order_direction = Some(direction);
        self
    }

    /// The filter string, unless absent or blank.
    pub fn filter(&self) -> Option<&str> {
        self.query_filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
    }

    /// Fill the unset options from the given defaults.
    pub fn or_defaults(&self, per_page: i64, direction: OrderDirection) -> Self {
        Self {
            per_page: Some(self.per_page.unwrap_or(per_page)),
            order_direction: Some(self.order_direction.unwrap_or(direction)),
            ..self.clone()
        }
    }

    /// Check `page`/`per_page` against their allowed domains. An unset
    /// `per_page` is not checked.
    pub fn validate(&self, max_per_page: Option<i64>) -> PageResult<()> {
        if self.page != LAST_PAGE && self.page < 1 {
            return Err(PageError::InvalidWindow(format!(
                "page must be >= 1 or {LAST_PAGE}, got {}",
                self.page
            )));
        }
        let Some(per_page) = self.per_page else {
            return Ok(());
        };
        if per_page != UNLIMITED && per_page < 1 {
            return Err(PageError::InvalidWindow(format!(
                "per_page must be >= 1 or {UNLIMITED}, got {per_page}"
            )));
        }
        if let Some(max) = max_per_page {
            if per_page > max {
                return Err(PageError::InvalidWindow(format!(
                    "per_page must not exceed {max}, got {per_page}"
                )));
            }
        }
        Ok(())
    }

    /// Caller-facing (camelCase) query parameters. Unset options are omitted.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(PAGE, self.page.to_string())];
        if let Some(per_page) = self.per_page {
            pairs.push((PER_PAGE, per_page.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push((ORDER_BY, order_by.clone()));
        }
        if let Some(direction) = self.order_direction {
            pairs.push((ORDER_DIRECTION, direction.to_string()));
        }
        if let Some(filter) = &self.query_filter {
            pairs.push((QUERY_FILTER, filter.clone()));
        }
        pairs
            .into_iter()
            .map(|(key, value)| (to_external_name(key), value))
            .collect()
    }

    /// Build a query from request parameters, camelCase or snake_case.
    /// Unknown parameters are ignored; missing ones stay unset.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> PageResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::from_query_pairs_with_defaults(pairs, Self::default())
    }

    pub fn from_query_pairs_with_defaults<I, K, V>(pairs: I, defaults: Self) -> PageResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = defaults;
        for (key, value) in pairs {
            let value = value.as_ref();
            match pagination_parameter(key.as_ref()) {
                Some(PAGE) => query.page = parse_int("page", value)?,
                Some(PER_PAGE) => query.per_page = Some(parse_int("perPage", value)?),
                Some(ORDER_BY) => query.order_by = Some(value.to_string()),
                Some(ORDER_DIRECTION) => query.order_direction = Some(value.parse()?),
                Some(QUERY_FILTER) => query.query_filter = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(query)
    }

    /// Parse a URL query string (`page=2&perPage=10&queryFilter=...`).
    pub fn from_query_string(query: &str) -> PageResult<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_query_pairs(form_urlencoded::parse(query.as_bytes()))
    }
}

fn parse_int(name: &str, value: &str) -> PageResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| PageError::InvalidWindow(format!("{name} must be an integer, got '{value}'")))
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    /// Effective page number (never the [`LAST_PAGE`] sentinel).
    pub page: u64,
    /// Effective page size, [`UNLIMITED`] included.
    pub per_page: i64,
    pub total: u64,
    pub total_pages: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl<T> PaginationResult<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Attach `next`/`previous` links built from `query` against `route`.
    ///
    /// Every parameter of `query` is carried over; only `page` changes.
    /// Parameters already on `route` are kept, except pagination parameters
    /// in either casing, which `query` replaces.
    pub fn set_pagination_guides(&mut self, route: &str, query: &PaginationQuery) {
        let pairs = query.to_query_pairs();
        self.next = self
            .has_next()
            .then(|| build_link(route, &pairs, self.page + 1));
        self.previous = self
            .has_previous()
            .then(|| build_link(route, &pairs, self.page - 1));
    }

    /// Convert the items, keeping the metadata.
    pub fn map_items<U, F>(self, f: F) -> PaginationResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginationResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            next: self.next,
            previous: self.previous,
        }
    }
}

fn build_link(route: &str, pairs: &[(String, String)], page: u64) -> String {
    let (path, existing) = route.split_once('?').unwrap_or((route, ""));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(existing.as_bytes()) {
        if pagination_parameter(&key).is_none() {
            serializer.append_pair(&key, &value);
        }
    }
    for (key, value) in pairs {
        if key == PAGE {
            serializer.append_pair(key, &page.to_string());
        } else {
            serializer.append_pair(key, value);
        }
    }

    format!("{path}?{}", serializer.finish())
}

/// A concrete slice of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub offset: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// `ceil(total / per_page)`, never less than 1.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1)).max(1)
}

/// Resolve a validated `(page, per_page)` pair against `total` matches.
///
/// Out-of-range pages are not clamped: they produce a window past the end.
pub fn resolve_window(page: i64, per_page: i64, total: u64) -> PageWindow {
    if per_page == UNLIMITED {
        return PageWindow {
            page: 1,
            offset: 0,
            limit: total,
            total_pages: 1,
        };
    }

    let per_page = per_page.max(1) as u64;
    let total_pages = total_pages(total, per_page);
    let page = if page == LAST_PAGE {
        total_pages
    } else {
        page.max(1) as u64
    };

    PageWindow {
        page,
        offset: (page - 1).saturating_mul(per_page),
        limit: per_page,
        total_pages,
    }
}
