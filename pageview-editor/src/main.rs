use clap::Parser;
use iced::widget::{
    button, column, container, horizontal_space, image as img, row, scrollable, text, text_input, Column,
};
use iced::{event, keyboard, mouse, Element, Event, Length, Size, Subscription, Task, Theme};
use pageview_core::{
    GestureKind, GestureSample, Point, ToolbarSync, ViewerConfig, ViewerError, ViewerPhase, ViewportController,
};
use std::path::PathBuf;
use std::time::Instant;

mod pdf_viewer;
mod renderer;
mod viewport;
mod wheel_capture;

use pdf_viewer::PdfView;
use renderer::PdfRenderer;
use viewport::PageLayout;
use wheel_capture::WheelCapture;

/// Pixels per wheel notch for line-based scroll deltas.
const LINE_HEIGHT: f32 = 40.0;

#[derive(Debug, Parser)]
#[command(name = "pageview-editor", about = "View a PDF with wheel zoom and page tracking")]
struct Args {
    /// PDF file to open
    path: Option<PathBuf>,

    /// JSON file overriding zoom and gesture settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter("pageview_editor=debug,pageview_core=debug,info")
        .init();

    let args = Args::parse();

    iced::application("Page Viewer", PdfEditor::update, PdfEditor::view)
        .subscription(PdfEditor::subscription)
        .theme(|_| Theme::Dark)
        .run_with(move || PdfEditor::new(args))
}

#[derive(Debug, Clone)]
enum Message {
    OpenFile,
    BytesLoaded(Result<Vec<u8>, String>),
    Wheel(mouse::ScrollDelta, iced::Point),
    ModifiersChanged(keyboard::Modifiers),
    ViewportResized(Size),
    Scrolled(scrollable::Viewport),
    PageInput(String),
    PageSubmitted,
    PreviousPage,
    NextPage,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

struct PdfEditor {
    path: Option<PathBuf>,
    renderer: Result<PdfRenderer, String>,
    controller: ViewportController<PdfView>,
    toolbar: ToolbarSync,
    modifiers: keyboard::Modifiers,
    viewport_size: Option<Size>,
}

/// iced reports wheel-up as positive; the controller expects negative for
/// "away from the user".
fn wheel_sample(delta: mouse::ScrollDelta, position: iced::Point, modifier_held: bool) -> GestureSample {
    let delta_y = match delta {
        mouse::ScrollDelta::Lines { y, .. } => -y * LINE_HEIGHT,
        mouse::ScrollDelta::Pixels { y, .. } => -y,
    };
    GestureSample {
        delta_y: f64::from(delta_y),
        modifier_held,
        pointer: Point::new(f64::from(position.x), f64::from(position.y)),
    }
}

/// The capture widget swallows every modifier wheel event. One classified as
/// a scroll (inside the cooldown) is scrolled natively on its behalf.
fn replayed_scroll(kind: GestureKind, sample: &GestureSample) -> Option<f32> {
    match kind {
        GestureKind::Scroll if sample.modifier_held => Some(sample.delta_y as f32),
        GestureKind::Scroll | GestureKind::Zoom | GestureKind::Dropped => None,
    }
}

fn pages_id() -> scrollable::Id {
    scrollable::Id::new("pages")
}

fn load_config(path: Option<&std::path::Path>) -> ViewerConfig {
    match path.map(ViewerConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Ignoring config: {}", e);
            ViewerConfig::default()
        }
    }
}

impl PdfEditor {
    fn new(args: Args) -> (Self, Task<Message>) {
        let config = load_config(args.config.as_deref());
        let renderer = PdfRenderer::new().map_err(|e| {
            tracing::error!("{:#}", e);
            format!("{e:#}")
        });

        let editor = Self {
            path: args.path,
            renderer,
            controller: ViewportController::new(config),
            toolbar: ToolbarSync::new(),
            modifiers: keyboard::Modifiers::default(),
            viewport_size: None,
        };
        let task = editor.open();
        (editor, task)
    }

    fn open(&self) -> Task<Message> {
        let Some(path) = self.path.clone() else {
            return Task::none();
        };
        Task::perform(
            async move {
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
            },
            Message::BytesLoaded,
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => return self.open(),
            Message::BytesLoaded(result) => {
                let ticket = self.controller.begin_load();
                let renderer = self.renderer.clone();
                let decoded = result
                    .and_then(|bytes| PdfView::open(&renderer?, bytes).map_err(|e| format!("{e:#}")))
                    .map_err(ViewerError::Load);
                self.controller.complete_load(ticket, decoded);
                if let (Some(size), Some(pdf)) = (self.viewport_size, self.controller.engine_mut()) {
                    pdf.set_viewport(f64::from(size.width), f64::from(size.height));
                }
                return self.after_view_change();
            }
            Message::Wheel(delta, position) => {
                let sample = wheel_sample(delta, position, self.modifiers.command());
                let classification = self.controller.handle_wheel(&sample, Instant::now());
                if classification.kind == GestureKind::Zoom {
                    return self.after_view_change();
                }
                if let Some(dy) = replayed_scroll(classification.kind, &sample) {
                    return scrollable::scroll_by(pages_id(), scrollable::AbsoluteOffset { x: 0.0, y: dy });
                }
            }
            Message::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
            }
            Message::ViewportResized(size) => {
                self.viewport_size = Some(size);
                if let Some(pdf) = self.controller.engine_mut() {
                    pdf.set_viewport(f64::from(size.width), f64::from(size.height));
                    pdf.render_visible();
                }
            }
            Message::Scrolled(viewport) => {
                let offset = viewport.absolute_offset();
                let bounds = viewport.bounds();
                self.viewport_size = Some(bounds.size());

                if let Some(pdf) = self.controller.engine_mut() {
                    pdf.on_scrolled(
                        Point::new(f64::from(offset.x), f64::from(offset.y)),
                        (f64::from(bounds.width), f64::from(bounds.height)),
                    );
                    pdf.render_visible();
                }
                if self.controller.poll_page_events() {
                    self.toolbar.sync(&self.controller);
                }
            }
            Message::PageInput(value) => {
                self.toolbar.input(&value);
            }
            Message::PageSubmitted => {
                self.toolbar.commit(&mut self.controller);
                return self.after_view_change();
            }
            Message::PreviousPage => {
                self.toolbar.previous(&mut self.controller);
                return self.after_view_change();
            }
            Message::NextPage => {
                self.toolbar.next(&mut self.controller);
                return self.after_view_change();
            }
            Message::ZoomIn => {
                self.toolbar.zoom_in(&mut self.controller);
                return self.after_view_change();
            }
            Message::ZoomOut => {
                self.toolbar.zoom_out(&mut self.controller);
                return self.after_view_change();
            }
            Message::ZoomReset => {
                self.toolbar.reset_zoom(&mut self.controller);
                return self.after_view_change();
            }
        }
        Task::none()
    }

    /// Resync the toolbar, render what is now visible and flush any queued
    /// programmatic scroll to the widget.
    fn after_view_change(&mut self) -> Task<Message> {
        self.toolbar.sync(&self.controller);

        let Some(pdf) = self.controller.engine_mut() else {
            return Task::none();
        };
        pdf.render_visible();

        match pdf.take_pending_scroll() {
            Some(target) => scrollable::scroll_to(
                pages_id(),
                scrollable::AbsoluteOffset {
                    x: target.x as f32,
                    y: target.y as f32,
                },
            ),
            None => Task::none(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                Some(Message::ModifiersChanged(modifiers))
            }
            _ => None,
        })
    }

    fn view(&self) -> Element<Message> {
        let body = match self.controller.phase() {
            ViewerPhase::Unloaded => centered(text("Open a PDF document to get started").size(16)),
            ViewerPhase::Loading => centered(text("Loading document...").size(16)),
            ViewerPhase::Failed(message) => centered(text(format!("Could not open document: {message}")).size(16)),
            ViewerPhase::Ready => self.pages_view(),
        };

        column![self.toolbar_view(), body].into()
    }

    fn toolbar_view(&self) -> Element<Message> {
        let toolbar = self.toolbar.view(&self.controller);

        let total = match toolbar.total_pages {
            Some(total) => format!("/ {total}"),
            None => "/ -".to_string(),
        };

        let mut page_input = text_input("", &toolbar.page_text).width(Length::Fixed(48.0));
        if toolbar.total_pages.is_some() {
            page_input = page_input
                .on_input(Message::PageInput)
                .on_submit(Message::PageSubmitted);
        }

        row![
            button("Open").on_press_maybe(self.path.is_some().then_some(Message::OpenFile)),
            horizontal_space(),
            button("▲").on_press_maybe(toolbar.can_go_previous.then_some(Message::PreviousPage)),
            button("▼").on_press_maybe(toolbar.can_go_next.then_some(Message::NextPage)),
            page_input,
            text(total),
            horizontal_space(),
            button("−").on_press_maybe(toolbar.can_zoom.then_some(Message::ZoomOut)),
            text(toolbar.zoom_label),
            button("+").on_press_maybe(toolbar.can_zoom.then_some(Message::ZoomIn)),
            button("Reset").on_press_maybe(toolbar.can_zoom.then_some(Message::ZoomReset)),
        ]
        .spacing(10)
        .padding(10)
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn pages_view(&self) -> Element<Message> {
        let Some(pdf) = self.controller.engine() else {
            return centered(text("No document loaded"));
        };

        let scale = pdf.scale().value();
        let layout = pdf.layout();
        let pages = (0..layout.page_count()).map(|index| {
            let (width, height) = layout.page_size(index, scale);
            let (width, height) = (Length::Fixed(width as f32), Length::Fixed(height as f32));
            let page: Element<Message> = match pdf.cached_page(index) {
                Some(handle) => img(handle.clone()).width(width).height(height).into(),
                None => container(text("Rendering page..."))
                    .width(width)
                    .height(height)
                    .center_x(width)
                    .center_y(height)
                    .into(),
            };
            page
        });

        let column = scrollable(Column::with_children(pages).spacing(PageLayout::PAGE_GAP as f32))
            .id(pages_id())
            .direction(scrollable::Direction::Both {
                vertical: scrollable::Scrollbar::default(),
                horizontal: scrollable::Scrollbar::default(),
            })
            .on_scroll(Message::Scrolled)
            .width(Length::Fill)
            .height(Length::Fill);

        WheelCapture::new(
            column,
            self.modifiers.command(),
            Message::Wheel,
            Message::ViewportResized,
        )
        .into()
    }
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_sample_direction_and_pointer() {
        let up = wheel_sample(mouse::ScrollDelta::Lines { x: 0.0, y: 1.0 }, iced::Point::new(12.0, 30.0), true);
        assert_eq!(up.delta_y, -f64::from(LINE_HEIGHT));
        assert!(up.modifier_held);
        assert_eq!(up.pointer, Point::new(12.0, 30.0));

        let down = wheel_sample(mouse::ScrollDelta::Pixels { x: 0.0, y: -25.0 }, iced::Point::ORIGIN, false);
        assert_eq!(down.delta_y, 25.0);
    }

    #[test]
    fn test_captured_scroll_is_replayed() {
        let held = wheel_sample(mouse::ScrollDelta::Pixels { x: 0.0, y: -30.0 }, iced::Point::ORIGIN, true);
        assert_eq!(replayed_scroll(GestureKind::Scroll, &held), Some(30.0));
        assert_eq!(replayed_scroll(GestureKind::Zoom, &held), None);
        assert_eq!(replayed_scroll(GestureKind::Dropped, &held), None);

        // Without the modifier the scrollable already scrolled natively.
        let plain = GestureSample {
            modifier_held: false,
            ..held
        };
        assert_eq!(replayed_scroll(GestureKind::Scroll, &plain), None);
    }

    #[test]
    fn test_args_path_and_config() {
        let args = Args::try_parse_from(["pageview-editor", "doc.pdf", "--config", "zoom.json"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("doc.pdf")));
        assert_eq!(args.config, Some(PathBuf::from("zoom.json")));
    }

    #[test]
    fn test_args_are_optional() {
        let args = Args::try_parse_from(["pageview-editor"]).unwrap();
        assert!(args.path.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("nope.json").as_path()));
        assert_eq!(config, ViewerConfig::default());
    }
}
