//! The viewport controller: sole owner of [`ViewState`].
//!
//! Lifecycle is `Unloaded -> Loading -> Ready`, with `Failed` as the terminal
//! state of a load that could not be decoded. Every new document restarts at
//! `Loading` with a new generation; completions and page reports tagged with
//! an older generation are discarded.
//!
//! Page tracking only listens to user-originated scrolling. The controller
//! already knows where its own writes land, so reports tagged
//! [`ScrollOrigin::Controller`] never feed back into `current_page`.

use crate::config::ViewerConfig;
use crate::engine::{DocumentDecoder, RenderingEngine, ScrollOrigin, VisiblePageEvent, VisiblePageSink};
use crate::error::{Result, ViewerError};
use crate::gesture::{Classification, GestureClassifier, GestureKind, GestureSample};
use crate::viewport::ViewState;
use crate::zoom::{self, Point, Scale, ZoomDirection, ZoomResult};
use std::time::Instant;
use tokio::sync::mpsc;

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of an asynchronous decode, ready to hand to
/// [`ViewportController::complete`].
#[derive(Debug)]
pub struct LoadCompletion<E> {
    pub ticket: LoadTicket,
    pub result: Result<E>,
}

/// Decode `bytes` with `decoder` without holding the controller.
pub async fn decode_document<D: DocumentDecoder>(
    decoder: &D,
    ticket: LoadTicket,
    bytes: Vec<u8>,
) -> LoadCompletion<D::Engine> {
    let result = decoder.decode(bytes).await;
    LoadCompletion { ticket, result }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerPhase {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

struct Session<E> {
    engine: E,
    view: ViewState,
    page_events: mpsc::UnboundedReceiver<VisiblePageEvent>,
}

enum DocumentState<E> {
    Unloaded,
    Loading { ticket: LoadTicket },
    Ready(Session<E>),
    Failed { message: String },
}

pub struct ViewportController<E> {
    config: ViewerConfig,
    classifier: GestureClassifier,
    generation: u64,
    state: DocumentState<E>,
}

impl<E: RenderingEngine> ViewportController<E> {
    pub fn new(config: ViewerConfig) -> Self {
        let classifier = GestureClassifier::new(&config.gesture);
        Self {
            config,
            classifier,
            generation: 0,
            state: DocumentState::Unloaded,
        }
    }

    /// Increases with every [`begin_load`](Self::begin_load).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn phase(&self) -> ViewerPhase {
        match &self.state {
            DocumentState::Unloaded => ViewerPhase::Unloaded,
            DocumentState::Loading { .. } => ViewerPhase::Loading,
            DocumentState::Ready(_) => ViewerPhase::Ready,
            DocumentState::Failed { message } => ViewerPhase::Failed(message.clone()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, DocumentState::Ready(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            DocumentState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Current view, available once the document is ready.
    pub fn view(&self) -> Option<ViewState> {
        match &self.state {
            DocumentState::Ready(session) => Some(session.view),
            _ => None,
        }
    }

    pub fn engine(&self) -> Option<&E> {
        match &self.state {
            DocumentState::Ready(session) => Some(&session.engine),
            _ => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        match &mut self.state {
            DocumentState::Ready(session) => Some(&mut session.engine),
            _ => None,
        }
    }

    /// Document bytes arrived: discard the previous document and start loading.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
        };
        self.state = DocumentState::Loading { ticket };
        self.classifier.reset();
        tracing::debug!(generation = ticket.generation, "loading document");
        ticket
    }

    /// Resolve the load identified by `ticket`.
    ///
    /// Returns `false` if the ticket is stale, in which case the result is
    /// dropped and the current state is untouched.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<E>) -> bool {
        match self.state {
            DocumentState::Loading { ticket: current } if current == ticket => {}
            _ => {
                tracing::warn!(
                    generation = ticket.generation,
                    current = self.generation,
                    "ignoring stale document load"
                );
                return false;
            }
        }

        self.state = match result.and_then(|engine| Self::attach(engine, ticket)) {
            Ok(session) => {
                tracing::debug!(
                    generation = ticket.generation,
                    total_pages = session.view.total_pages,
                    "document ready"
                );
                DocumentState::Ready(session)
            }
            Err(err) => {
                tracing::warn!(generation = ticket.generation, "document load failed: {}", err);
                DocumentState::Failed {
                    message: err.to_string(),
                }
            }
        };
        true
    }

    pub fn complete(&mut self, completion: LoadCompletion<E>) -> bool {
        self.complete_load(completion.ticket, completion.result)
    }

    fn attach(mut engine: E, ticket: LoadTicket) -> Result<Session<E>> {
        let total_pages = engine.total_pages();
        if total_pages == 0 {
            return Err(ViewerError::EmptyDocument);
        }

        let (sink, page_events) = VisiblePageSink::channel(ticket.generation);
        engine.subscribe_to_visible_page_change(sink)?;

        let view = ViewState::new(total_pages);
        engine.render_at_scale(view.scale);

        Ok(Session {
            engine,
            view,
            page_events,
        })
    }

    fn session_mut(&mut self) -> Result<&mut Session<E>> {
        match &mut self.state {
            DocumentState::Ready(session) => Ok(session),
            _ => Err(ViewerError::NotReady),
        }
    }

    /// Jump to page `page`, clamped to `[1, total_pages]`. Returns the clamped
    /// page.
    ///
    /// Before the document is ready this is a no-op; the page count is not
    /// known yet, so only the lower bound is applied to the reported value.
    ///
    /// Reports queued before the jump describe a position the view is
    /// leaving and are discarded.
    pub fn set_page(&mut self, page: u32) -> u32 {
        let Ok(session) = self.session_mut() else {
            tracing::debug!(page, "set_page before document is ready");
            return page.max(1);
        };

        while session.page_events.try_recv().is_ok() {}

        let page = session.view.clamp_page(page);
        session.view.current_page = page;
        session.engine.scroll_to_page(page);
        page
    }

    /// Returns `false` when already on the last page.
    pub fn next_page(&mut self) -> bool {
        match self.view() {
            Some(view) if view.has_next() => {
                self.set_page(view.current_page + 1);
                true
            }
            _ => false,
        }
    }

    /// Returns `false` when already on the first page.
    pub fn previous_page(&mut self) -> bool {
        match self.view() {
            Some(view) if view.has_previous() => {
                self.set_page(view.current_page - 1);
                true
            }
            _ => false,
        }
    }

    pub fn step_zoom_in(&mut self) -> Result<Scale> {
        self.step_zoom(ZoomDirection::In)
    }

    pub fn step_zoom_out(&mut self) -> Result<Scale> {
        self.step_zoom(ZoomDirection::Out)
    }

    fn step_zoom(&mut self, direction: ZoomDirection) -> Result<Scale> {
        let step = self.config.step.clone();
        let session = self.session_mut()?;
        let scale = zoom::step_zoom(session.view.scale, direction, &step);
        Self::write_scale(session, scale);
        Ok(scale)
    }

    /// Back to 100%.
    pub fn reset_zoom(&mut self) -> Result<Scale> {
        self.set_scale(Scale::ONE)?;
        Ok(Scale::ONE)
    }

    pub fn set_scale(&mut self, scale: Scale) -> Result<()> {
        let session = self.session_mut()?;
        Self::write_scale(session, scale);
        Ok(())
    }

    /// Write a wheel zoom result: scale first, then the anchoring scroll.
    ///
    /// Page reports are only drained by [`poll_page_events`](Self::poll_page_events),
    /// so nothing observes the state between the two writes.
    pub fn apply_zoom_result(&mut self, result: ZoomResult) -> Result<()> {
        let session = self.session_mut()?;
        Self::write_scale(session, result.new_scale);
        session.engine.scroll_by(result.scroll_delta);
        Ok(())
    }

    fn write_scale(session: &mut Session<E>, scale: Scale) {
        if session.view.scale == scale {
            return;
        }
        tracing::debug!(from = session.view.scale.value(), to = scale.value(), "scale changed");
        session.view.scale = scale;
        session.engine.render_at_scale(scale);
    }

    /// Route one wheel event. The caller suppresses native handling when the
    /// returned classification says so; scroll events are left to the host.
    pub fn handle_wheel(&mut self, sample: &GestureSample, now: Instant) -> Classification {
        let classification = self.classifier.classify(sample, now);

        if classification.kind != GestureKind::Zoom {
            return classification;
        }

        let (scale, offset) = match &self.state {
            DocumentState::Ready(session) => (session.view.scale, session.engine.scroll_offset()),
            _ => return classification,
        };
        let anchor = Point::new(sample.pointer.x + offset.x, sample.pointer.y + offset.y);
        let result = zoom::compute_zoom(
            scale,
            sample.delta_y.abs(),
            ZoomDirection::from_delta(sample.delta_y),
            anchor,
            &self.config.wheel,
        );
        if let Err(err) = self.apply_zoom_result(result) {
            tracing::debug!("wheel zoom not applied: {}", err);
        }
        classification
    }

    /// Drain page-tracking reports. Returns `true` if the current page changed.
    pub fn poll_page_events(&mut self) -> bool {
        let generation = self.generation;
        let DocumentState::Ready(session) = &mut self.state else {
            return false;
        };

        let before = session.view.current_page;
        while let Ok(event) = session.page_events.try_recv() {
            if event.generation != generation || event.origin == ScrollOrigin::Controller {
                continue;
            }
            session.view.current_page = session.view.clamp_page(event.page);
        }

        let changed = session.view.current_page != before;
        if changed {
            tracing::trace!(page = session.view.current_page, "visible page changed");
        }
        changed
    }
}

impl<E: RenderingEngine> Default for ViewportController<E> {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::ScrollDelta;

    #[derive(Debug, Default)]
    struct RecordingEngine {
        pages: u32,
        scale: Option<f64>,
        scrolled_to: Vec<u32>,
        offset: Point,
        sink: Option<VisiblePageSink>,
    }

    impl RenderingEngine for RecordingEngine {
        fn total_pages(&self) -> u32 {
            self.pages
        }

        fn render_at_scale(&mut self, scale: Scale) {
            self.scale = Some(scale.value());
        }

        fn scroll_to_page(&mut self, page: u32) {
            self.scrolled_to.push(page);
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

    fn ready(pages: u32) -> ViewportController<RecordingEngine> {
        let mut controller = ViewportController::default();
        let ticket = controller.begin_load();
        assert!(controller.complete_load(
            ticket,
            Ok(RecordingEngine {
                pages,
                ..Default::default()
            })
        ));
        controller
    }

    #[test]
    fn test_phases() {
        let mut controller: ViewportController<RecordingEngine> = ViewportController::default();
        assert_eq!(controller.phase(), ViewerPhase::Unloaded);

        let ticket = controller.begin_load();
        assert_eq!(controller.phase(), ViewerPhase::Loading);
        assert!(controller.view().is_none());

        controller.complete_load(
            ticket,
            Ok(RecordingEngine {
                pages: 3,
                ..Default::default()
            }),
        );
        assert_eq!(controller.phase(), ViewerPhase::Ready);
        assert_eq!(controller.view().unwrap().total_pages, 3);
        assert_eq!(controller.engine().unwrap().scale, Some(1.0));
        assert!(controller.engine().unwrap().sink.is_some());
    }

    #[test]
    fn test_decode_failure_is_terminal() {
        let mut controller: ViewportController<RecordingEngine> = ViewportController::default();
        let ticket = controller.begin_load();
        controller.complete_load(ticket, Err(ViewerError::Load("bad xref".into())));

        assert_eq!(
            controller.phase(),
            ViewerPhase::Failed("failed to decode document: bad xref".into())
        );
        assert!(matches!(controller.step_zoom_in(), Err(ViewerError::NotReady)));
        assert_eq!(controller.set_page(4), 4);
        assert!(controller.view().is_none());
    }

    #[test]
    fn test_empty_document_fails() {
        let mut controller: ViewportController<RecordingEngine> = ViewportController::default();
        let ticket = controller.begin_load();
        controller.complete_load(ticket, Ok(RecordingEngine::default()));
        assert_eq!(controller.error_message(), Some("document has no pages"));
    }

    #[test]
    fn test_set_page_clamps_and_scrolls() {
        let mut controller = ready(10);
        assert_eq!(controller.set_page(0), 1);
        assert_eq!(controller.set_page(7), 7);
        assert_eq!(controller.set_page(42), 10);
        assert_eq!(controller.view().unwrap().current_page, 10);
        assert_eq!(controller.engine().unwrap().scrolled_to, vec![1, 7, 10]);
    }

    #[test]
    fn test_set_page_before_ready() {
        let mut controller: ViewportController<RecordingEngine> = ViewportController::default();
        assert_eq!(controller.set_page(0), 1);
        assert_eq!(controller.set_page(5), 5);
    }

    #[test]
    fn test_next_and_previous_stop_at_bounds() {
        let mut controller = ready(2);
        assert!(!controller.previous_page());
        assert!(controller.next_page());
        assert_eq!(controller.view().unwrap().current_page, 2);
        assert!(!controller.next_page());
        assert!(controller.previous_page());
        assert_eq!(controller.view().unwrap().current_page, 1);
    }

    #[test]
    fn test_step_zoom_writes_engine() {
        let mut controller = ready(1);
        assert_eq!(controller.step_zoom_in().unwrap().value(), 1.25);
        assert_eq!(controller.engine().unwrap().scale, Some(1.25));
        assert_eq!(controller.step_zoom_out().unwrap().value(), 1.0);
        controller.step_zoom_in().unwrap();
        assert_eq!(controller.reset_zoom().unwrap(), Scale::ONE);
        assert_eq!(controller.engine().unwrap().scale, Some(1.0));
    }

    #[test]
    fn test_wheel_zoom_anchors_under_pointer() {
        let mut controller = ready(5);
        controller.engine_mut().unwrap().offset = Point::new(0.0, 100.0);

        let sample = GestureSample {
            delta_y: -40.0,
            modifier_held: true,
            pointer: Point::new(50.0, 200.0),
        };
        let classification = controller.handle_wheel(&sample, Instant::now());
        assert_eq!(classification.kind, GestureKind::Zoom);

        let view = controller.view().unwrap();
        assert_eq!(view.scale.value(), 1.2);
        // Anchor at content (50, 300), factor 1.2.
        let offset = controller.engine().unwrap().offset;
        assert_eq!(offset.x, 50.0 * (1.2 - 1.0));
        assert_eq!(offset.y, 100.0 + 300.0 * (1.2 - 1.0));
    }

    #[test]
    fn test_scroll_event_leaves_scale_alone() {
        let mut controller = ready(5);
        let t0 = Instant::now();
        let scroll = GestureSample {
            delta_y: 30.0,
            modifier_held: false,
            pointer: Point::default(),
        };
        controller.handle_wheel(&scroll, t0);

        let zoom_attempt = GestureSample {
            modifier_held: true,
            ..scroll
        };
        let c = controller.handle_wheel(&zoom_attempt, t0 + std::time::Duration::from_millis(20));
        assert_eq!(c.kind, GestureKind::Scroll);
        assert_eq!(controller.view().unwrap().scale, Scale::ONE);
        assert_eq!(controller.engine().unwrap().offset, Point::default());
    }

    #[test]
    fn test_page_tracking_updates_current_page() {
        let mut controller = ready(10);
        let sink = controller.engine().unwrap().sink.clone().unwrap();

        sink.report(3, ScrollOrigin::User);
        sink.report(4, ScrollOrigin::User);
        assert!(controller.poll_page_events());
        assert_eq!(controller.view().unwrap().current_page, 4);
        assert!(!controller.poll_page_events());
    }

    #[test]
    fn test_own_jump_is_not_tracked_back() {
        let mut controller = ready(10);
        let sink = controller.engine().unwrap().sink.clone().unwrap();

        controller.set_page(8);
        // Pages the engine passes on its way to page 8.
        sink.report(5, ScrollOrigin::Controller);
        sink.report(7, ScrollOrigin::Controller);
        assert!(!controller.poll_page_events());
        assert_eq!(controller.view().unwrap().current_page, 8);

        sink.report(9, ScrollOrigin::User);
        assert!(controller.poll_page_events());
        assert_eq!(controller.view().unwrap().current_page, 9);
    }

    #[test]
    fn test_jump_after_tracking_overrides_it() {
        let mut controller = ready(10);
        let sink = controller.engine().unwrap().sink.clone().unwrap();

        sink.report(4, ScrollOrigin::User);
        controller.poll_page_events();
        controller.set_page(2);
        assert_eq!(controller.view().unwrap().current_page, 2);
        assert!(!controller.poll_page_events());
    }

    #[test]
    fn test_jump_discards_pending_reports() {
        let mut controller = ready(10);
        let sink = controller.engine().unwrap().sink.clone().unwrap();

        sink.report(4, ScrollOrigin::User);
        controller.set_page(2);
        assert!(!controller.poll_page_events());
        assert_eq!(controller.view().unwrap().current_page, 2);
    }

    #[test]
    fn test_apply_zoom_result_writes_scale_then_scroll() {
        let mut controller = ready(3);
        let result = ZoomResult {
            new_scale: Scale::wheel(1.5, &controller.config().wheel),
            factor: 1.5,
            scroll_delta: ScrollDelta { x: 10.0, y: 40.0 },
        };
        controller.apply_zoom_result(result).unwrap();

        assert_eq!(controller.view().unwrap().scale.value(), 1.5);
        let engine = controller.engine().unwrap();
        assert_eq!(engine.scale, Some(1.5));
        assert_eq!(engine.offset, Point::new(10.0, 40.0));
    }

    #[test]
    fn test_apply_zoom_result_before_ready() {
        let mut controller: ViewportController<RecordingEngine> = ViewportController::default();
        let result = ZoomResult {
            new_scale: Scale::ONE,
            factor: 1.0,
            scroll_delta: ScrollDelta::default(),
        };
        assert!(matches!(controller.apply_zoom_result(result), Err(ViewerError::NotReady)));
    }

    #[test]
    fn test_tracking_report_is_clamped() {
        let mut controller = ready(3);
        controller.engine().unwrap().sink.clone().unwrap().report(12, ScrollOrigin::User);
        controller.poll_page_events();
        assert_eq!(controller.view().unwrap().current_page, 3);
    }
}
