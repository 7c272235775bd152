// Fixed-size windows over a candidate list

/// Hard limit on options in a single select menu
pub const PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator<T> {
    items: Vec<T>,
    page: usize,
    page_size: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_page_size(items, PAGE_SIZE)
    }

    pub fn with_page_size(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    /// Zero-based index of the current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current(&self) -> &[T] {
        let start = (self.page * self.page_size).min(self.items.len());
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    /// Move forward one page; false (and no change) on the last page
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Move back one page; false (and no change) on the first page
    pub fn prev_page(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        for (n, pages) in [(0, 0), (1, 1), (25, 1), (26, 2), (50, 2), (51, 3), (120, 5)] {
            let paginator = Paginator::new((0..n).collect::<Vec<_>>());
            assert_eq!(paginator.page_count(), pages, "n = {}", n);
        }
    }

    #[test]
    fn test_windows_cover_every_item_once() {
        let mut paginator = Paginator::new((0..60).collect::<Vec<_>>());
        let mut seen = paginator.current().to_vec();
        while paginator.next_page() {
            seen.extend_from_slice(paginator.current());
        }
        assert_eq!(seen, (0..60).collect::<Vec<_>>());
        assert_eq!(paginator.current(), &(50..60).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn test_moves_past_ends_are_noops() {
        let mut paginator = Paginator::new((0..30).collect::<Vec<_>>());
        assert!(!paginator.prev_page());
        assert_eq!(paginator.page(), 0);

        assert!(paginator.next_page());
        assert!(!paginator.next_page());
        assert_eq!(paginator.page(), 1);
        assert_eq!(paginator.current().len(), 5);

        assert!(paginator.prev_page());
        assert_eq!(paginator.page(), 0);
    }

    #[test]
    fn test_empty_paginator() {
        let mut paginator: Paginator<u8> = Paginator::new(Vec::new());
        assert!(paginator.current().is_empty());
        assert!(!paginator.next_page());
        assert!(!paginator.has_prev());
    }
}
