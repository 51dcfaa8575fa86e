use crate::renderer::{Document, PdfRenderer};
use crate::viewport::{PageLayout, ScrollTracker};
use anyhow::Result;
use iced::widget::image::Handle;
use pageview_core::{Point, RenderingEngine, Scale, ScrollDelta, ScrollOrigin, VisiblePageSink};
use std::collections::HashMap;

/// Pages kept rendered on each side of the visible ones.
const CACHE_MARGIN: usize = 2;

/// pdfium-backed engine: a vertical column of rendered pages inside an iced
/// scrollable.
///
/// Programmatic scrolls are queued in the [`ScrollTracker`] and flushed by
/// the app as a scroll task; the resulting `on_scrolled` callback is reported
/// as [`ScrollOrigin::Controller`].
#[derive(Debug)]
pub struct PdfView {
    document: Document,
    layout: PageLayout,
    scale: Scale,
    scroll: ScrollTracker,
    sink: Option<VisiblePageSink>,
    last_reported: Option<u32>,
    page_cache: HashMap<(usize, u32), Handle>, // (page_index, zoom_percent) -> rendered image
}

impl PdfView {
    pub fn open(renderer: &PdfRenderer, bytes: Vec<u8>) -> Result<Self> {
        let document = renderer.load_document(bytes)?;
        let layout = PageLayout::new(document.page_sizes());
        Ok(Self {
            document,
            layout,
            scale: Scale::ONE,
            scroll: ScrollTracker::default(),
            sink: None,
            last_reported: None,
            page_cache: HashMap::new(),
        })
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Size of the scrollable, known before any scrolling happens.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.scroll.set_viewport(width, height);
    }

    pub fn take_pending_scroll(&mut self) -> Option<Point> {
        self.scroll.take_pending()
    }

    /// The scrollable moved, either natively or because of a flushed
    /// programmatic scroll.
    pub fn on_scrolled(&mut self, offset: Point, viewport: (f64, f64)) {
        let origin = self.scroll.on_scrolled(offset, viewport);
        self.report_visible_page(origin);
    }

    fn report_visible_page(&mut self, origin: ScrollOrigin) {
        let page = self.layout.most_visible_page(
            self.scroll.offset().y,
            self.scroll.viewport().1,
            self.scale.value(),
        );
        if self.last_reported == Some(page) {
            return;
        }
        self.last_reported = Some(page);
        if let Some(sink) = &self.sink {
            sink.report(page, origin);
        }
    }

    /// Render every page intersecting the viewport at the current scale and
    /// drop bitmaps that have scrolled far out of view.
    pub fn render_visible(&mut self) {
        let visible = self.layout.visible_range(
            self.scroll.offset().y,
            self.scroll.viewport().1.max(1.0),
            self.scale.value(),
        );

        let keep = self.layout.cache_window(visible.clone(), CACHE_MARGIN);
        self.page_cache.retain(|&(index, _), _| keep.contains(&index));

        for index in visible {
            self.render_page(index);
        }
    }

    fn render_page(&mut self, index: usize) {
        let cache_key = (index, self.scale.percent());
        if self.page_cache.contains_key(&cache_key) {
            return;
        }

        match self.document.render_page(index, self.scale.value() as f32) {
            Ok(img) => {
                let width = img.width();
                let height = img.height();
                let handle = Handle::from_rgba(width, height, img.into_raw());
                self.page_cache.insert(cache_key, handle);
            }
            Err(e) => {
                tracing::error!("Failed to render page {}: {:#}", index, e);
            }
        }
    }

    pub fn cached_page(&self, index: usize) -> Option<&Handle> {
        self.page_cache.get(&(index, self.scale.percent()))
    }
}

impl RenderingEngine for PdfView {
    fn total_pages(&self) -> u32 {
        self.document.page_count() as u32
    }

    fn render_at_scale(&mut self, scale: Scale) {
        self.scale = scale;
        // Bitmaps at other scales are never shown again.
        let percent = scale.percent();
        self.page_cache.retain(|&(_, zoom_percent), _| zoom_percent == percent);
    }

    fn scroll_to_page(&mut self, page: u32) {
        let top = self.layout.page_top(page, self.scale.value());
        self.scroll.queue(Point::new(0.0, top), &self.layout, self.scale.value());
    }

    fn scroll_by(&mut self, delta: ScrollDelta) {
        let offset = self.scroll.offset();
        let target = Point::new(offset.x + delta.x, offset.y + delta.y);
        self.scroll.queue(target, &self.layout, self.scale.value());
    }

    fn scroll_offset(&self) -> Point {
        self.scroll.offset()
    }

    fn subscribe_to_visible_page_change(&mut self, sink: VisiblePageSink) -> pageview_core::Result<()> {
        self.last_reported = None;
        self.sink = Some(sink);
        Ok(())
    }
}
