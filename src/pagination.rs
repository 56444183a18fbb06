//! Fixed-size paging for grouped summary tables.

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    Prev,
    Next,
    First,
}

/// Number of pages needed for `total` rows; zero rows have zero pages.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size)
}

/// Keeps `page` inside `[0, page_count - 1]`, or at 0 when there are no pages.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.min(page_count(total, page_size).saturating_sub(1))
}

/// Applies a navigation action from `current`, never leaving the valid range.
pub fn navigate(current: usize, action: Option<PageAction>, total: usize, page_size: usize) -> usize {
    let target = match action {
        Some(PageAction::Prev) => current.saturating_sub(1),
        Some(PageAction::Next) => current.saturating_add(1),
        Some(PageAction::First) => 0,
        None => current,
    };
    clamp_page(target, total, page_size)
}

/// One page of rows plus the envelope the table controls need.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T: Serialize> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T: Serialize> Paged<T> {
    /// Slices `rows` at `page`, clamping the index first.
    pub fn slice(rows: Vec<T>, page: usize, page_size: usize) -> Self {
        let total = rows.len();
        let page = clamp_page(page, total, page_size);
        let items = rows
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect();
        Self {
            items,
            page,
            page_count: page_count(total, page_size),
            page_size,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_three_rows_make_three_pages() {
        assert_eq!(page_count(23, PAGE_SIZE), 3);
        assert_eq!(page_count(20, PAGE_SIZE), 2);
        assert_eq!(page_count(0, PAGE_SIZE), 0);
    }

    #[test]
    fn next_from_last_page_stays() {
        assert_eq!(navigate(2, Some(PageAction::Next), 23, PAGE_SIZE), 2);
        assert_eq!(navigate(1, Some(PageAction::Next), 23, PAGE_SIZE), 2);
    }

    #[test]
    fn prev_from_first_page_stays() {
        assert_eq!(navigate(0, Some(PageAction::Prev), 23, PAGE_SIZE), 0);
        assert_eq!(navigate(2, Some(PageAction::First), 23, PAGE_SIZE), 0);
    }

    #[test]
    fn stale_page_is_clamped_when_rows_shrink() {
        assert_eq!(navigate(5, None, 23, PAGE_SIZE), 2);
        assert_eq!(navigate(5, None, 0, PAGE_SIZE), 0);
    }

    #[test]
    fn slice_returns_the_last_partial_page() {
        let rows: Vec<u32> = (0..23).collect();
        let paged = Paged::slice(rows, 2, PAGE_SIZE);
        assert_eq!(paged.items, vec![20, 21, 22]);
        assert_eq!(paged.page_count, 3);
        assert_eq!(paged.total, 23);
    }

    #[test]
    fn slice_of_nothing() {
        let paged = Paged::slice(Vec::<u32>::new(), 3, PAGE_SIZE);
        assert!(paged.items.is_empty());
        assert_eq!(paged.page, 0);
        assert_eq!(paged.page_count, 0);
    }
}
