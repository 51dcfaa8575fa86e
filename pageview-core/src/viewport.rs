use crate::zoom::Scale;

/// Authoritative view state of one open document.
///
/// Pages are 1-based. A fresh instance is built for every loaded document;
/// only [`ViewportController`](crate::ViewportController) mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub scale: Scale,
    pub current_page: u32,
    pub total_pages: u32,
}

impl ViewState {
    /// `total_pages` must be at least 1.
    pub fn new(total_pages: u32) -> Self {
        debug_assert!(total_pages >= 1);
        Self {
            scale: Scale::ONE,
            current_page: 1,
            total_pages,
        }
    }

    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}
