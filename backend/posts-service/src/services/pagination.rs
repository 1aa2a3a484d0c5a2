/// Page slicing for post listings
///
/// `Paginator` follows the usual page-number semantics: pages are numbered
/// from 1 and there is always at least one page, even for an empty listing.
/// Handlers use the lenient `resolve`, so a bad `?page=` never turns into an
/// error page.
use crate::db::{PostFilter, Store};
use crate::error::{AppError, Result};
use crate::models::PostView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub count: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            return 1;
        }
        self.count / self.per_page + i64::from(self.count % self.per_page != 0)
    }

    /// Strict check: `number` must be a page that exists.
    pub fn validate_number(&self, number: i64) -> Result<i64> {
        if number < 1 {
            return Err(AppError::NotFound(format!(
                "page number {} is less than 1",
                number
            )));
        }
        if number > self.num_pages() {
            return Err(AppError::NotFound(format!(
                "page {} contains no results",
                number
            )));
        }
        Ok(number)
    }

    /// Lenient lookup for a raw `?page=` value. Anything that is not an
    /// integer gives the first page; integers out of range give the last.
    pub fn resolve(&self, raw: Option<&str>) -> i64 {
        let Some(number) = raw.and_then(|r| r.trim().parse::<i64>().ok()) else {
            return 1;
        };
        match self.validate_number(number) {
            Ok(number) => number,
            Err(_) => self.num_pages(),
        }
    }

    /// `(limit, offset)` for a valid page number.
    pub fn bounds(&self, number: i64) -> (i64, i64) {
        (self.per_page, (number - 1) * self.per_page)
    }

    pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        let has_next = number < num_pages;
        let has_previous = number > 1;
        let (start_index, end_index) = if self.count == 0 {
            (0, 0)
        } else {
            let start = (number - 1) * self.per_page + 1;
            (start, start + items.len() as i64 - 1)
        };

        Page {
            items,
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(number + 1),
            previous_page_number: has_previous.then_some(number - 1),
            start_index,
            end_index,
        }
    }
}

/// One page of a listing plus the metadata a pager needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
    /// 1-based index of the first item on the page, 0 when empty.
    pub start_index: i64,
    pub end_index: i64,
}

/// Count, resolve the requested page and fetch its slice in one go.
///
/// The count and the slice are two separate store reads. A post published
/// between them can leave `count`, `has_next` and `end_index` one write behind
/// `items`; the next request sees a consistent listing again.
pub async fn paginate_posts(
    store: &dyn Store,
    filter: PostFilter,
    raw_page: Option<&str>,
    per_page: i64,
) -> Result<Page<PostView>> {
    let count = store.count_posts(filter).await?;
    let paginator = Paginator::new(count, per_page);
    let number = paginator.resolve(raw_page);
    let (limit, offset) = paginator.bounds(number);
    let items = store.list_posts(filter, limit, offset).await?;
    Ok(paginator.page(number, items))
}
