pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page)
}

/// Slices 1-based page `page`; page 0 is read as page 1. Pages past the end
/// yield no items.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let slice = items.iter().skip(start).take(per_page).cloned().collect();

    Page {
        items: slice,
        page,
        total_pages: total_pages(items.len(), per_page),
        total_items: items.len(),
    }
}

/// Numbered buttons around the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Show page 1 followed by an ellipsis.
    pub leading_first: bool,
    pub pages: Vec<usize>,
    /// Show an ellipsis followed by this last page.
    pub trailing_last: Option<usize>,
}

pub fn page_window(current: usize, total_pages: usize) -> PageWindow {
    let start = current.saturating_sub(1).max(1);
    let pages = (0..total_pages.min(3))
        .map(|offset| offset + start)
        .filter(|p| *p <= total_pages)
        .collect();

    PageWindow {
        leading_first: current > 3,
        pages,
        trailing_last: (current + 2 < total_pages).then_some(total_pages),
    }
}

/// Current page within `1..=total_pages`. Moves outside that range are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current: usize,
    total_pages: usize,
}

impl Pager {
    pub fn new(total_pages: usize) -> Self {
        Self {
            current: 1,
            total_pages,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn go_to(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages {
            self.current = page;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, total_pages: usize) {
        self.total_pages = total_pages;
        self.current = 1;
    }

    pub fn window(&self) -> PageWindow {
        page_window(self.current, self.total_pages)
    }
}
