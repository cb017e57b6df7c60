use crate::state::LiveView;

/// Where the live view gets drawn. Keeping this behind a trait leaves the
/// state and row computation testable without a terminal.
pub trait Surface {
    /// Redraw the whole view after a state change.
    fn render(&mut self, view: &LiveView);
    /// Surface a user-visible message outside the normal redraw.
    fn alert(&mut self, message: &str);
}
