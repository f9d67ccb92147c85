//! Derived view over the filtered collection: paging, filter state, the
//! query string mirrored into the address bar, and search debouncing.

use crate::domain::{Launch, LaunchFilters, OutcomeFilter, SortOrder};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::form_urlencoded;

/// Most page numbers the pager shows at once
pub const PAGE_WINDOW: usize = 7;

/// Number of pages needed for `len` items
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Page numbers to offer around `current`, pinned to the ends of the range
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }
    let half = PAGE_WINDOW / 2;
    let start = if current <= half + 1 {
        1
    } else if current + half >= total_pages {
        total_pages - PAGE_WINDOW + 1
    } else {
        current - half
    };
    (start..start + PAGE_WINDOW).collect()
}

/// Distinct UTC years of the collection, newest first
pub fn available_years(launches: &[Launch]) -> Vec<i32> {
    let years: BTreeSet<i32> = launches.iter().map(Launch::year_utc).collect();
    years.into_iter().rev().collect()
}

/// One rendered page plus the numbers the results line shows
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub items: Vec<Launch>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total: usize,
    /// 1-based index of the first item shown, 0 when empty
    pub start: usize,
    /// 1-based index of the last item shown
    pub end: usize,
    pub favorites_only: bool,
}

/// Everything the filter bar and pager control
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    filters: LaunchFilters,
    show_favorites: bool,
    sort: SortOrder,
    page: usize,
    page_size: usize,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: LaunchFilters::default(),
            show_favorites: false,
            sort: SortOrder::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Start from query parameters; absent ones keep their defaults
    pub fn from_query(query: &str, page_size: usize) -> Self {
        let mut state = Self::new(page_size);
        let query = query.trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => state.filters.search = value.into_owned(),
                "year" => state.filters.year = value.parse().ok(),
                "success" => state.filters.success = OutcomeFilter::parse(&value),
                _ => {}
            }
        }
        state
    }

    /// Query string for the address bar; defaults are left out
    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if !self.filters.search.is_empty() {
            out.append_pair("search", &self.filters.search);
        }
        if let Some(year) = self.filters.year {
            out.append_pair("year", &year.to_string());
        }
        if self.filters.success != OutcomeFilter::All {
            out.append_pair("success", self.filters.success.as_str());
        }
        out.finish()
    }

    pub fn filters(&self) -> &LaunchFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn show_favorites(&self) -> bool {
        self.show_favorites
    }

    /// Criteria actually applied: favorites-only overrides the outcome selector
    pub fn effective_filters(&self) -> LaunchFilters {
        let mut filters = self.filters.clone();
        if self.show_favorites {
            filters.success = OutcomeFilter::Favorites;
        }
        filters
    }

    pub fn set_filters(&mut self, filters: LaunchFilters) {
        if filters != self.filters {
            self.filters = filters;
            self.page = 1;
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let filters = LaunchFilters {
            search: search.into(),
            ..self.filters.clone()
        };
        self.set_filters(filters);
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        let filters = LaunchFilters {
            year,
            ..self.filters.clone()
        };
        self.set_filters(filters);
    }

    pub fn set_outcome(&mut self, success: OutcomeFilter) {
        let filters = LaunchFilters {
            success,
            ..self.filters.clone()
        };
        self.set_filters(filters);
    }

    pub fn set_show_favorites(&mut self, show: bool) {
        if show != self.show_favorites {
            self.show_favorites = show;
            self.page = 1;
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        if sort != self.sort {
            self.sort = sort;
            self.page = 1;
        }
    }

    /// Pages below 1 read as 1; the upper bound is enforced by `paginate`
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Clamp the current page into `[1, page_count]` and cut out that page
    pub fn paginate(&mut self, launches: &[Launch]) -> PageView {
        let total = launches.len();
        let total_pages = page_count(total, self.page_size);
        if total_pages > 0 && self.page > total_pages {
            self.page = total_pages;
        }
        let offset = (self.page - 1) * self.page_size;
        let items: Vec<Launch> = launches
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();
        PageView {
            start: if items.is_empty() { 0 } else { offset + 1 },
            end: offset + items.len(),
            items,
            current_page: self.page,
            total_pages,
            total,
            favorites_only: self.show_favorites,
        }
    }
}

/// Trailing-edge debouncer: only the last value of a burst comes through.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Waits out the delay; `None` if a newer value arrived meanwhile
    pub async fn settle<T>(&self, value: T) -> Option<T> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        (self.latest.load(Ordering::SeqCst) == ticket).then_some(value)
    }
}
