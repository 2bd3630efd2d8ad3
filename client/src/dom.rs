use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlButtonElement, HtmlCanvasElement, Window,
};

use crate::geometry::canvas_size_for;
use crate::ports::{Controls, ListRow, ListSurface, OverlayCanvas};
use crate::state::{ActionSlot, Phase};

const RECT_COLOR: &str = "#3498db";
const MARKER_COLOR: &str = "#e74c3c";
const LABEL_FONT: &str = "16px Arial";
const LABEL_FILL: &str = "white";
const LABEL_OUTLINE: &str = "black";
const LABEL_OUTLINE_WIDTH: f64 = 3.0;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_visible(element: &Element, visible: bool) {
    let _ = element
        .class_list()
        .toggle_with_force("hidden", !visible);
}

/// Matches the canvas backing store to the video's displayed size. Must run
/// before any render that follows a layout change.
pub fn fit_canvas_to_video(canvas: &HtmlCanvasElement, video: &Element) {
    let rect = video.get_bounding_client_rect();
    let (width, height) = canvas_size_for(rect.width(), rect.height());
    if canvas.width() == width && canvas.height() == height {
        return;
    }
    log::debug!(
        "Resizing overlay from {}x{} to {width}x{height}",
        canvas.width(),
        canvas.height()
    );
    canvas.set_width(width);
    canvas.set_height(height);
}

pub struct CanvasOverlay {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasOverlay {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Canvas 2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    fn prepare_label(&self) {
        self.ctx.set_font(LABEL_FONT);
        self.ctx.set_text_align("center");
    }
}

impl OverlayCanvas for CanvasOverlay {
    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, line_width: f64) {
        self.ctx.set_stroke_style_str(RECT_COLOR);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(x, y, width, height);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ctx.set_fill_style_str(MARKER_COLOR);
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, radius, 0.0, std::f64::consts::PI * 2.0);
        self.ctx.fill();
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.prepare_label();
        self.ctx.set_stroke_style_str(LABEL_OUTLINE);
        self.ctx.set_line_width(LABEL_OUTLINE_WIDTH);
        let _ = self.ctx.stroke_text(text, x, y);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.prepare_label();
        self.ctx.set_fill_style_str(LABEL_FILL);
        let _ = self.ctx.fill_text(text, x, y);
    }
}

pub struct DomList {
    document: Document,
    container: Element,
}

impl DomList {
    pub fn new(document: Document, container: Element) -> Self {
        Self {
            document,
            container,
        }
    }

    fn row_element(&self, row: &ListRow) -> Result<Element, JsValue> {
        let item = self.document.create_element("div")?;
        item.set_class_name("measurement-item");
        let label = self.document.create_element("span")?;
        if row.emphasized {
            let strong = self.document.create_element("strong")?;
            strong.set_text_content(Some(&row.label));
            label.append_child(&strong)?;
        } else {
            label.set_text_content(Some(&row.label));
        }
        let value = self.document.create_element("span")?;
        value.set_text_content(Some(&row.value));
        item.append_child(&label)?;
        item.append_child(&value)?;
        Ok(item)
    }
}

impl ListSurface for DomList {
    fn show(&mut self, rows: &[ListRow]) {
        self.container.set_inner_html("");
        for row in rows {
            match self.row_element(row) {
                Ok(item) => {
                    let _ = self.container.append_child(&item);
                }
                Err(error) => log::error!("Failed to build list row: {error:?}"),
            }
        }
    }
}

pub struct DomControls {
    pub window: Window,
    pub status_el: Element,
    pub reference_setup: Element,
    pub calibrate_button: HtmlButtonElement,
    pub measure_button: HtmlButtonElement,
    pub scan_button: HtmlButtonElement,
    pub reset_button: HtmlButtonElement,
}

impl DomControls {
    fn button(&self, slot: ActionSlot) -> &HtmlButtonElement {
        match slot {
            ActionSlot::Calibrate => &self.calibrate_button,
            ActionSlot::Measure => &self.measure_button,
            ActionSlot::Scan => &self.scan_button,
            ActionSlot::Reset => &self.reset_button,
        }
    }
}

impl Controls for DomControls {
    fn set_status(&mut self, phase: Phase, text: &str) {
        let _ = self.status_el.set_attribute("data-state", phase.as_str());
        self.status_el.set_text_content(Some(text));
    }

    fn notify(&mut self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn set_enabled(&mut self, slot: ActionSlot, enabled: bool) {
        let button = self.button(slot);
        button.set_disabled(!enabled);
        let busy = if enabled { "false" } else { "true" };
        let _ = button.set_attribute("aria-busy", busy);
    }

    fn set_scan_label(&mut self, scanning: bool) {
        let label = if scanning { "Stop room scan" } else { "Scan room" };
        self.scan_button.set_text_content(Some(label));
        let pressed = if scanning { "true" } else { "false" };
        let _ = self.scan_button.set_attribute("aria-pressed", pressed);
    }

    fn show_reference_setup(&mut self, visible: bool) {
        let _ = self
            .reference_setup
            .class_list()
            .toggle_with_force("active", visible);
    }
}
