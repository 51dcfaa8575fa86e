//! # pageview-core
//!
//! Viewport interaction controller for paged documents.
//!
//! A single wheel stream carries both scrolling and modifier-zooming. This
//! crate separates the two ([`GestureClassifier`]), turns zoom gestures into
//! anchored scale changes ([`zoom`]), keeps the authoritative page and scale
//! ([`ViewportController`]) and binds them to a toolbar without feedback loops
//! ([`ToolbarSync`]).
//!
//! Rendering and byte fetching stay outside: the controller drives any
//! [`RenderingEngine`] and loads through any [`DocumentDecoder`].
//!
//! ```no_run
//! use pageview_core::{ToolbarSync, ViewerConfig, ViewportController};
//! # fn run<E: pageview_core::RenderingEngine>(engine: E) {
//! let mut controller = ViewportController::new(ViewerConfig::default());
//! let mut toolbar = ToolbarSync::new();
//!
//! let ticket = controller.begin_load();
//! controller.complete_load(ticket, Ok(engine));
//! toolbar.sync(&controller);
//!
//! controller.set_page(3);
//! controller.step_zoom_in().unwrap();
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod toolbar;
pub mod viewport;
pub mod zoom;

pub use config::{GestureTiming, StepZoomConfig, ViewerConfig, WheelZoomConfig};
pub use controller::{decode_document, LoadCompletion, LoadTicket, ViewerPhase, ViewportController};
pub use engine::{DocumentDecoder, RenderingEngine, ScrollOrigin, VisiblePageEvent, VisiblePageSink};
pub use error::{Result, ViewerError};
pub use gesture::{Classification, GestureClassifier, GestureKind, GestureSample, GestureState};
pub use toolbar::{parse_page_input, ToolbarSync, ToolbarView};
pub use viewport::ViewState;
pub use zoom::{Point, Scale, ScrollDelta, ZoomDirection, ZoomResult};
