use serde::{Deserialize, Serialize};

/// Number of page links returned around the current page.
pub const PAGE_WINDOW: u64 = 3;

/// Page size limits applied to list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the request does not give a usable `limit`.
    pub default_limit: u64,
    /// Upper bound on the page size a client can ask for.
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
        }
    }
}

/// Raw `page` / `limit` query parameters.
///
/// Kept as strings so that junk values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Page size, always at least 1.
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Resolve query parameters against the configured limits.
    ///
    /// - `page`: missing, unparsable or below 1 becomes 1.
    /// - `limit`: missing or unparsable becomes `default_limit`, then it is
    ///   clamped to `1..=max_limit`.
    pub fn from_query(query: &PageQuery, config: &PaginationConfig) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|page| *page >= 1)
            .map(|page| page as u64)
            .unwrap_or(1);

        let max_limit = config.max_limit.max(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(parse_leading_int)
            .map(|limit| limit.max(1) as u64)
            .unwrap_or(config.default_limit)
            .clamp(1, max_limit);

        Self { page, limit }
    }

    /// Number of documents to skip before this page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// `ceil(item_count / limit)`.
    pub fn page_count(&self, item_count: u64) -> u64 {
        item_count.div_ceil(self.limit.max(1))
    }

    /// Whether pages exist after the current one.
    pub fn has_more(&self, page_count: u64) -> bool {
        self.page < page_count
    }

    /// Up to [`PAGE_WINDOW`] page numbers around the current page.
    ///
    /// The window is pinned to the start while the current page is near it,
    /// and never extends past `page_count`.
    pub fn page_numbers(&self, page_count: u64) -> Vec<u64> {
        let end = (self.page + PAGE_WINDOW / 2).max(PAGE_WINDOW).min(page_count);
        let start = if self.page < PAGE_WINDOW - 1 {
            1
        } else {
            (end + 1).saturating_sub(PAGE_WINDOW).max(1)
        };

        (start..=end).collect()
    }

    /// Page links for the list envelope, rooted at `path`.
    pub fn page_links(&self, path: &str, page_count: u64) -> Vec<PageLink> {
        self.page_numbers(page_count)
            .into_iter()
            .map(|number| PageLink {
                number,
                url: format!("{path}?page={number}&limit={}", self.limit),
            })
            .collect()
    }
}

/// A navigable page in a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub number: u64,
    pub url: String,
}

/// Parse the leading integer of `raw`, ignoring trailing garbage (`"3abc"` is 3).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end]
        .parse::<i64>()
        .ok()
        .map(|value| value * sign)
}
