use crate::state::{ActionSlot, Phase};

/// Drawing surface laid over the video element.
pub trait OverlayCanvas {
    fn clear(&mut self);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, line_width: f64);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);
    /// Outline pass of a centred label.
    fn stroke_text(&mut self, text: &str, x: f64, y: f64);
    /// Fill pass of a centred label.
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListRow {
    pub label: String,
    pub value: String,
    pub emphasized: bool,
}

pub trait ListSurface {
    fn show(&mut self, rows: &[ListRow]);
}

/// Everything the dispatcher touches outside the canvas and the list.
pub trait Controls {
    fn set_status(&mut self, phase: Phase, text: &str);
    /// Interrupting notice carrying error detail.
    fn notify(&mut self, message: &str);
    fn set_enabled(&mut self, slot: ActionSlot, enabled: bool);
    fn set_scan_label(&mut self, scanning: bool);
    fn show_reference_setup(&mut self, visible: bool);
}

pub struct Ports {
    pub overlay: Box<dyn OverlayCanvas>,
    pub list: Box<dyn ListSurface>,
    pub controls: Box<dyn Controls>,
}
