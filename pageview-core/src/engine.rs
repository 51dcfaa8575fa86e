//! The boundary to the document renderer.
//!
//! The controller drives an engine through [`RenderingEngine`] and never looks
//! at pixels. Visible-page reports travel back over a channel, so an engine
//! can report from its own scroll handler without borrowing the controller.

use crate::error::Result;
use crate::zoom::{Point, Scale, ScrollDelta};
use std::future::Future;
use tokio::sync::mpsc;

pub trait RenderingEngine {
    fn total_pages(&self) -> u32;

    fn render_at_scale(&mut self, scale: Scale);

    /// Bring 1-based `page` into view.
    fn scroll_to_page(&mut self, page: u32);

    /// Apply an immediate, non-animated scroll adjustment.
    fn scroll_by(&mut self, delta: ScrollDelta);

    /// Current scroll offset of the viewport over the content.
    fn scroll_offset(&self) -> Point;

    /// Start reporting the most visible page to `sink`. Called once per load.
    ///
    /// Reports caused by the engine's own programmatic scrolling must be
    /// tagged [`ScrollOrigin::Controller`].
    fn subscribe_to_visible_page_change(&mut self, sink: VisiblePageSink) -> Result<()>;
}

/// Turns raw document bytes into an engine. Decoding may be slow, so it is
/// asynchronous and runs outside the controller.
pub trait DocumentDecoder {
    type Engine: RenderingEngine;

    fn decode(&self, bytes: Vec<u8>) -> impl Future<Output = Result<Self::Engine>>;
}

/// Who moved the scroll position that led to a page report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    /// Native scrolling: wheel, scrollbar, keyboard.
    User,
    /// A write requested by the controller (`scroll_to_page`, `scroll_by`).
    Controller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisiblePageEvent {
    pub generation: u64,
    pub page: u32,
    pub origin: ScrollOrigin,
}

/// Sending half of a page-tracking subscription.
#[derive(Debug, Clone)]
pub struct VisiblePageSink {
    generation: u64,
    tx: mpsc::UnboundedSender<VisiblePageEvent>,
}

impl VisiblePageSink {
    pub(crate) fn channel(generation: u64) -> (Self, mpsc::UnboundedReceiver<VisiblePageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { generation, tx }, rx)
    }

    /// Report that `page` is now the most visible page.
    ///
    /// Silently does nothing once the document this sink belongs to has been
    /// replaced.
    pub fn report(&self, page: u32, origin: ScrollOrigin) {
        let event = VisiblePageEvent {
            generation: self.generation,
            page,
            origin,
        };
        if self.tx.send(event).is_err() {
            tracing::trace!(generation = self.generation, page, "page report for a closed document");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
