//! Page-number resolution and page envelopes.

use serde::Serialize;

/// Splits `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u32,
    count: u64,
}

impl Paginator {
    /// `per_page` of zero is treated as one.
    pub fn new(per_page: u32, count: u64) -> Self {
        Self {
            per_page: per_page.max(1),
            count,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Effective page size, never zero.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total pages; at least one, even for an empty listing.
    pub fn num_pages(&self) -> u32 {
        let pages = self.count.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Resolves a raw request parameter to a valid page number.
    ///
    /// Missing or non-numeric input selects page 1; numbers outside
    /// `1..=num_pages` clamp to the nearest bound.
    pub fn resolve(&self, raw: Option<&str>) -> u32 {
        let Some(requested) = raw.and_then(parse_page_number) else {
            return 1;
        };
        let last = i64::from(self.num_pages());
        let clamped = requested.clamp(1, last);
        u32::try_from(clamped).unwrap_or(1)
    }

    /// Row offset of the first item on page `number`.
    pub fn offset(&self, number: u32) -> u64 {
        u64::from(number.saturating_sub(1)) * u64::from(self.per_page)
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            count: self.count,
            per_page: self.per_page,
        }
    }
}

/// Accepts integers and integral floats (`"2"`, `" 2 "`, `"2.0"`).
fn parse_page_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        // Saturating cast; clamping happens afterwards.
        Some(value as i64)
    } else {
        None
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u32,
    pub num_pages: u32,
    /// Total items across all pages.
    pub count: u64,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
