#![allow(dead_code)]

use pageview_core::{
    DocumentDecoder, Point, RenderingEngine, Result, Scale, ScrollDelta, ScrollOrigin, ViewerError, ViewportController,
    VisiblePageSink,
};
use std::time::Duration;

/// In-memory engine with fixed-height pages stacked vertically.
#[derive(Debug)]
pub struct FakeEngine {
    pub pages: u32,
    pub page_height: f64,
    pub scale: f64,
    pub offset: Point,
    pub render_calls: usize,
    pub sink: Option<VisiblePageSink>,
}

impl FakeEngine {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            page_height: 800.0,
            scale: 1.0,
            offset: Point::default(),
            render_calls: 0,
            sink: None,
        }
    }

    /// Simulate the user scrolling to `y` and the engine reporting the page.
    pub fn user_scroll_to(&mut self, y: f64) {
        self.offset.y = y;
        self.report(ScrollOrigin::User);
    }

    fn report(&self, origin: ScrollOrigin) {
        let page = (self.offset.y / (self.page_height * self.scale)).floor() as u32 + 1;
        if let Some(sink) = &self.sink {
            sink.report(page.min(self.pages), origin);
        }
    }
}

impl RenderingEngine for FakeEngine {
    fn total_pages(&self) -> u32 {
        self.pages
    }

    fn render_at_scale(&mut self, scale: Scale) {
        self.scale = scale.value();
        self.render_calls += 1;
    }

    fn scroll_to_page(&mut self, page: u32) {
        self.offset.y = f64::from(page - 1) * self.page_height * self.scale;
        self.report(ScrollOrigin::Controller);
    }

    fn scroll_by(&mut self, delta: ScrollDelta) {
        self.offset.x += delta.x;
        self.offset.y += delta.y;
    }

    fn scroll_offset(&self) -> Point {
        self.offset
    }

    fn subscribe_to_visible_page_change(&mut self, sink: VisiblePageSink) -> Result<()> {
        self.sink = Some(sink);
        Ok(())
    }
}

/// Decoder that treats the first byte as the page count.
pub struct FakeDecoder {
    pub delay: Duration,
}

impl DocumentDecoder for FakeDecoder {
    type Engine = FakeEngine;

    async fn decode(&self, bytes: Vec<u8>) -> Result<FakeEngine> {
        tokio::time::sleep(self.delay).await;
        match bytes.first() {
            Some(&pages) => Ok(FakeEngine::new(u32::from(pages))),
            None => Err(ViewerError::Load("empty byte stream".into())),
        }
    }
}

pub fn ready_controller(pages: u32) -> ViewportController<FakeEngine> {
    let mut controller = ViewportController::default();
    let ticket = controller.begin_load();
    assert!(controller.complete_load(ticket, Ok(FakeEngine::new(pages))));
    controller
}
