use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive their data as struct fields ("props"), may borrow
/// persistent state mutably, and draw into a `Rect` of the frame.
///
/// `render` takes `&mut self` so a component can update caches such as
/// measured heights or scroll offsets while drawing, like ratatui's
/// `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The high-level event this component emits.
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
