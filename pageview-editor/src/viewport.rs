use pageview_core::{Point, ScrollOrigin};
use std::ops::Range;

// Offsets closer than this count as the one we asked for.
const SCROLL_TOLERANCE: f64 = 0.5;

/// Vertical stack of pages, in PDF points at scale 1.0.
///
/// Positions are logical pixels at the given scale, with [`PageLayout::PAGE_GAP`]
/// between consecutive pages.
#[derive(Debug, Clone)]
pub struct PageLayout {
    sizes: Vec<(f32, f32)>,
}

impl PageLayout {
    pub const PAGE_GAP: f64 = 12.0;

    pub fn new(sizes: Vec<(f32, f32)>) -> Self {
        Self { sizes }
    }

    pub fn page_count(&self) -> usize {
        self.sizes.len()
    }

    /// Size of the page at 0-based `index`, scaled.
    pub fn page_size(&self, index: usize, scale: f64) -> (f64, f64) {
        let (w, h) = self.sizes.get(index).copied().unwrap_or_default();
        (f64::from(w) * scale, f64::from(h) * scale)
    }

    pub fn content_height(&self, scale: f64) -> f64 {
        let pages: f64 = self.sizes.iter().map(|&(_, h)| f64::from(h) * scale).sum();
        let gaps = self.sizes.len().saturating_sub(1) as f64 * Self::PAGE_GAP;
        pages + gaps
    }

    pub fn content_width(&self, scale: f64) -> f64 {
        self.sizes
            .iter()
            .map(|&(w, _)| f64::from(w) * scale)
            .fold(0.0, f64::max)
    }

    /// Clamp a scroll offset to what a viewport of `viewport` (width, height)
    /// can actually reach.
    pub fn clamp_offset(&self, offset: Point, viewport: (f64, f64), scale: f64) -> Point {
        let max_x = (self.content_width(scale) - viewport.0).max(0.0);
        let max_y = (self.content_height(scale) - viewport.1).max(0.0);
        Point::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
    }

    /// Pages worth keeping rendered around the `visible` ones.
    pub fn cache_window(&self, visible: Range<usize>, margin: usize) -> Range<usize> {
        visible.start.saturating_sub(margin)..(visible.end + margin).min(self.sizes.len())
    }

    /// Top edge of 1-based `page`.
    pub fn page_top(&self, page: u32, scale: f64) -> f64 {
        let before = (page.max(1) - 1) as usize;
        self.sizes
            .iter()
            .take(before)
            .map(|&(_, h)| f64::from(h) * scale + Self::PAGE_GAP)
            .sum()
    }

    /// 1-based page with the largest visible area in the window
    /// `[offset_y, offset_y + viewport_height)`. The earlier page wins ties.
    pub fn most_visible_page(&self, offset_y: f64, viewport_height: f64, scale: f64) -> u32 {
        let bottom = offset_y + viewport_height.max(1.0);
        let mut best = (0usize, f64::MIN);
        let mut top = 0.0;

        for (index, &(_, h)) in self.sizes.iter().enumerate() {
            let page_bottom = top + f64::from(h) * scale;
            let overlap = page_bottom.min(bottom) - top.max(offset_y);
            if overlap > best.1 {
                best = (index, overlap);
            }
            if top > bottom {
                break;
            }
            top = page_bottom + Self::PAGE_GAP;
        }
        best.0 as u32 + 1
    }

    /// 0-based indices of pages intersecting the window.
    pub fn visible_range(&self, offset_y: f64, viewport_height: f64, scale: f64) -> Range<usize> {
        let bottom = offset_y + viewport_height;
        let mut start = None;
        let mut end = 0;
        let mut top = 0.0;

        for (index, &(_, h)) in self.sizes.iter().enumerate() {
            let page_bottom = top + f64::from(h) * scale;
            if page_bottom >= offset_y && top <= bottom {
                start.get_or_insert(index);
                end = index + 1;
            }
            if top > bottom {
                break;
            }
            top = page_bottom + Self::PAGE_GAP;
        }
        match start {
            Some(start) => start..end,
            None => 0..0,
        }
    }
}

/// Scroll position of the page column, plus the programmatic scroll in flight.
///
/// Targets are clamped to the reachable range before they are sent, so the
/// widget lands exactly where it was told and the resulting callback can be
/// recognised as [`ScrollOrigin::Controller`].
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    offset: Point,
    viewport: (f64, f64),
    pending: Option<Point>,
    expected: Option<Point>,
}

impl ScrollTracker {
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    pub fn queue(&mut self, target: Point, layout: &PageLayout, scale: f64) {
        let target = layout.clamp_offset(target, self.viewport, scale);
        self.offset = target;
        self.pending = Some(target);
    }

    /// Programmatic scroll target not yet sent to the widget.
    pub fn take_pending(&mut self) -> Option<Point> {
        let target = self.pending.take()?;
        self.expected = Some(target);
        Some(target)
    }

    pub fn on_scrolled(&mut self, offset: Point, viewport: (f64, f64)) -> ScrollOrigin {
        let origin = match self.expected.take() {
            Some(expected)
                if (expected.x - offset.x).abs() < SCROLL_TOLERANCE
                    && (expected.y - offset.y).abs() < SCROLL_TOLERANCE =>
            {
                ScrollOrigin::Controller
            }
            _ => ScrollOrigin::User,
        };
        self.offset = offset;
        self.viewport = viewport;
        origin
    }
}
