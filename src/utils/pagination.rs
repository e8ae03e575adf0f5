// src/utils/pagination.rs
use serde::{Deserialize, Serialize};

use crate::errors::{TaxiError, TaxiResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub num_pages: u32,
    pub total: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Slices `items` into 1-based pages. Page 1 always exists, even when empty.
///
/// `page` is the raw query value: a number, `last`, or absent for the first
/// page. Anything else is a 404.
pub fn paginate<T>(items: Vec<T>, page: Option<&str>, per_page: usize) -> TaxiResult<Page<T>> {
    let per_page = per_page.max(1);
    let total = items.len();
    let num_pages = total.div_ceil(per_page).max(1) as u32;

    let page = match page.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => 1,
        Some("last") => num_pages,
        Some(raw) => raw.parse::<u32>().map_err(|_| TaxiError::PageNotFound(raw.to_string()))?,
    };
    if page == 0 || page > num_pages {
        return Err(TaxiError::PageNotFound(page.to_string()));
    }

    let start = (page as usize - 1) * per_page;
    let items = items.into_iter().skip(start).take(per_page).collect();

    Ok(Page {
        items,
        page,
        num_pages,
        total,
        has_next: page < num_pages,
        has_previous: page > 1,
    })
}
