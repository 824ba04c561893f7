//! Page window parameters for list queries.
//!
//! Pages are 0-indexed: page `n` skips `n * page_size` documents and returns at most `page_size`.

/// Default number of documents per page.
pub const PAGE_SIZE: usize = 60;

/// Parameters selecting a single page of results.
///
/// # Example
///
/// ```ignore
/// use staybook_core::page::PageRequest;
///
/// let page = PageRequest::new(2);
/// assert_eq!(page.offset(), 120);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The page index (0-indexed).
    pub page_idx: usize,
    /// Number of documents per page.
    pub page_size: usize,
}

impl PageRequest {
    /// Selects page `page_idx` with the default [`PAGE_SIZE`].
    pub fn new(page_idx: usize) -> Self {
        Self::with_size(page_idx, PAGE_SIZE)
    }

    /// Selects page `page_idx` with a custom page size.
    pub fn with_size(page_idx: usize, page_size: usize) -> Self {
        Self { page_idx, page_size }
    }

    /// Number of documents to skip to reach this page.
    pub fn offset(&self) -> usize {
        self.page_idx.saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0)
    }
}
