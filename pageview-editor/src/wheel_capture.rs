//! Wrapper around the page scrollable that sees wheel events first.
//!
//! Every wheel event over the content is published with the pointer position
//! relative to the widget. While the zoom modifier is held the event is
//! captured, so the scrollable underneath does not scroll natively.
//! The widget also publishes its size whenever layout changes it.

use iced::advanced::layout::{self, Layout};
use iced::advanced::renderer;
use iced::advanced::widget::{self, tree, Tree, Widget};
use iced::advanced::{overlay, Clipboard, Shell};
use iced::event::{self, Event};
use iced::mouse;
use iced::{Element, Length, Point, Rectangle, Size, Vector};

pub struct WheelCapture<'a, Message, Theme = iced::Theme, Renderer = iced::Renderer> {
    content: Element<'a, Message, Theme, Renderer>,
    modifier_held: bool,
    on_wheel: Box<dyn Fn(mouse::ScrollDelta, Point) -> Message + 'a>,
    on_resize: Box<dyn Fn(Size) -> Message + 'a>,
}

impl<'a, Message, Theme, Renderer> WheelCapture<'a, Message, Theme, Renderer> {
    pub fn new(
        content: impl Into<Element<'a, Message, Theme, Renderer>>,
        modifier_held: bool,
        on_wheel: impl Fn(mouse::ScrollDelta, Point) -> Message + 'a,
        on_resize: impl Fn(Size) -> Message + 'a,
    ) -> Self {
        Self {
            content: content.into(),
            modifier_held,
            on_wheel: Box::new(on_wheel),
            on_resize: Box::new(on_resize),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    size: Option<Size>,
}

impl<'a, Message, Theme, Renderer> Widget<Message, Theme, Renderer> for WheelCapture<'a, Message, Theme, Renderer>
where
    Renderer: renderer::Renderer,
{
    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<State>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(State::default())
    }

    fn children(&self) -> Vec<Tree> {
        vec![Tree::new(&self.content)]
    }

    fn diff(&self, tree: &mut Tree) {
        tree.diff_children(std::slice::from_ref(&self.content));
    }

    fn size(&self) -> Size<Length> {
        self.content.as_widget().size()
    }

    fn layout(&self, tree: &mut Tree, renderer: &Renderer, limits: &layout::Limits) -> layout::Node {
        self.content
            .as_widget()
            .layout(&mut tree.children[0], renderer, limits)
    }

    fn operate(
        &self,
        tree: &mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        operation: &mut dyn widget::Operation,
    ) {
        self.content
            .as_widget()
            .operate(&mut tree.children[0], layout, renderer, operation);
    }

    fn on_event(
        &mut self,
        tree: &mut Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        renderer: &Renderer,
        clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        viewport: &Rectangle,
    ) -> event::Status {
        let bounds = layout.bounds();
        let state = tree.state.downcast_mut::<State>();
        if state.size != Some(bounds.size()) {
            state.size = Some(bounds.size());
            shell.publish((self.on_resize)(bounds.size()));
        }

        if let Event::Mouse(mouse::Event::WheelScrolled { delta }) = &event {
            if let Some(position) = cursor.position_in(bounds) {
                shell.publish((self.on_wheel)(*delta, position));
                if self.modifier_held {
                    return event::Status::Captured;
                }
            }
        }

        self.content.as_widget_mut().on_event(
            &mut tree.children[0],
            event,
            layout,
            cursor,
            renderer,
            clipboard,
            shell,
            viewport,
        )
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &renderer::Style,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
    ) {
        self.content
            .as_widget()
            .draw(&tree.children[0], renderer, theme, style, layout, cursor, viewport);
    }

    fn mouse_interaction(
        &self,
        tree: &Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
        renderer: &Renderer,
    ) -> mouse::Interaction {
        self.content
            .as_widget()
            .mouse_interaction(&tree.children[0], layout, cursor, viewport, renderer)
    }

    fn overlay<'b>(
        &'b mut self,
        tree: &'b mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        translation: Vector,
    ) -> Option<overlay::Element<'b, Message, Theme, Renderer>> {
        self.content
            .as_widget_mut()
            .overlay(&mut tree.children[0], layout, renderer, translation)
    }
}

impl<'a, Message, Theme, Renderer> From<WheelCapture<'a, Message, Theme, Renderer>>
    for Element<'a, Message, Theme, Renderer>
where
    Message: 'a,
    Theme: 'a,
    Renderer: renderer::Renderer + 'a,
{
    fn from(capture: WheelCapture<'a, Message, Theme, Renderer>) -> Self {
        Element::new(capture)
    }
}
