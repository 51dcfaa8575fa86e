//! Two-way binding between the toolbar and the controller.
//!
//! The page field keeps its own draft text. The draft only reaches the
//! controller on commit, and it is overwritten whenever the controller's page
//! changes for any other reason: the live view wins over an abandoned edit.

use crate::controller::ViewportController;
use crate::engine::RenderingEngine;
use crate::zoom::Scale;

/// Everything the toolbar widgets need to draw themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarView {
    pub page_text: String,
    pub total_pages: Option<u32>,
    pub zoom_label: String,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_zoom: bool,
    /// Set when the document failed to load; every control is inert then.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolbarSync {
    draft: String,
    // (generation, page) the draft was last reset from.
    synced: Option<(u64, u32)>,
}

/// Interpret committed page-field text.
///
/// Empty or zero becomes page 1; anything past the end, including digit
/// strings too long to parse, becomes `total_pages`.
pub fn parse_page_input(text: &str, total_pages: u32) -> u32 {
    let total_pages = total_pages.max(1);
    match text.parse::<u32>() {
        Ok(page) => page.clamp(1, total_pages),
        Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => total_pages,
        Err(_) => 1,
    }
}

pub fn zoom_label(scale: Scale) -> String {
    format!("{}%", scale.percent())
}

impl ToolbarSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Reconcile the draft with the controller. Call after every state change.
    pub fn sync<E: RenderingEngine>(&mut self, controller: &ViewportController<E>) {
        let Some(view) = controller.view() else {
            self.draft.clear();
            self.synced = None;
            return;
        };

        let key = (controller.generation(), view.current_page);
        if self.synced != Some(key) {
            if !self.draft.is_empty() && self.draft != view.current_page.to_string() {
                tracing::trace!(draft = %self.draft, page = view.current_page, "discarding page draft");
            }
            self.draft = view.current_page.to_string();
            self.synced = Some(key);
        }
    }

    /// Replace the draft with `text` if it is all digits. Returns whether the
    /// edit was taken.
    pub fn input(&mut self, text: &str) -> bool {
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        self.draft.clear();
        self.draft.push_str(text);
        true
    }

    /// Append one typed character, ignoring anything but digits.
    pub fn type_char(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() {
            return false;
        }
        self.draft.push(c);
        true
    }

    /// Enter pressed in the page field. Returns the page jumped to, or `None`
    /// when no document is ready.
    pub fn commit<E: RenderingEngine>(&mut self, controller: &mut ViewportController<E>) -> Option<u32> {
        let view = controller.view()?;
        let page = parse_page_input(&self.draft, view.total_pages);

        self.draft = page.to_string();
        let page = controller.set_page(page);
        self.synced = Some((controller.generation(), page));
        Some(page)
    }

    pub fn previous<E: RenderingEngine>(&mut self, controller: &mut ViewportController<E>) -> bool {
        let moved = controller.previous_page();
        self.sync(controller);
        moved
    }

    pub fn next<E: RenderingEngine>(&mut self, controller: &mut ViewportController<E>) -> bool {
        let moved = controller.next_page();
        self.sync(controller);
        moved
    }

    pub fn zoom_in<E: RenderingEngine>(&mut self, controller: &mut ViewportController<E>) {
        if let Err(err) = controller.step_zoom_in() {
            tracing::debug!("zoom in ignored: {}", err);
        }
    }

    pub fn zoom_out<E: RenderingEngine>(&mut self, controller: &mut ViewportController<E>) {
        if let Err(err) = controller.step_zoom_out() {
            tracing::debug!("zoom out ignored: {}", err);
        }
    }

    pub fn reset_zoom<E: RenderingEngine>(&mut self, controller: &mut ViewportController<E>) {
        if let Err(err) = controller.reset_zoom() {
            tracing::debug!("zoom reset ignored: {}", err);
        }
    }

    pub fn view<E: RenderingEngine>(&self, controller: &ViewportController<E>) -> ToolbarView {
        match controller.view() {
            Some(view) => ToolbarView {
                page_text: self.draft.clone(),
                total_pages: Some(view.total_pages),
                zoom_label: zoom_label(view.scale),
                can_go_previous: view.has_previous(),
                can_go_next: view.has_next(),
                can_zoom: true,
                error: None,
            },
            None => ToolbarView {
                page_text: String::new(),
                total_pages: None,
                zoom_label: zoom_label(Scale::ONE),
                can_go_previous: false,
                can_go_next: false,
                can_zoom: false,
                error: controller.error_message().map(str::to_owned),
            },
        }
    }
}
