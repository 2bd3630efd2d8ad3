use measure_shared::{CalibrationRect, Measurement};

use crate::geometry::{format_cm, Rect, MARKER_RADIUS, STROKE_WIDTH};
use crate::ports::OverlayCanvas;

/// The last visual result. Built per render and dropped afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Calibration(Rect),
    Measurement {
        rect: Rect,
        width_cm: f64,
        height_cm: f64,
    },
}

impl Overlay {
    pub fn calibration(rect: &CalibrationRect) -> Self {
        Overlay::Calibration(Rect::from(*rect))
    }

    pub fn measurement(measurement: &Measurement) -> Self {
        Overlay::Measurement {
            rect: Rect::from(measurement.pixel_dims),
            width_cm: measurement.width,
            height_cm: measurement.height,
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            Overlay::Calibration(rect) => *rect,
            Overlay::Measurement { rect, .. } => *rect,
        }
    }
}

pub fn render_overlay(canvas: &mut dyn OverlayCanvas, overlay: &Overlay) {
    canvas.clear();
    let rect = overlay.rect();
    if !rect.is_finite() {
        log::warn!("Skipping overlay with non-finite geometry {rect:?}");
        return;
    }
    draw_marked_rect(canvas, rect);
    if let Overlay::Measurement {
        width_cm,
        height_cm,
        ..
    } = overlay
    {
        draw_label(canvas, &format_cm(*width_cm), rect.width_label_anchor());
        draw_label(canvas, &format_cm(*height_cm), rect.height_label_anchor());
    }
}

pub fn clear_overlay(canvas: &mut dyn OverlayCanvas) {
    canvas.clear();
}

fn draw_marked_rect(canvas: &mut dyn OverlayCanvas, rect: Rect) {
    canvas.stroke_rect(rect.x, rect.y, rect.width, rect.height, STROKE_WIDTH);
    for (x, y) in rect.corners() {
        canvas.fill_circle(x, y, MARKER_RADIUS);
    }
}

fn draw_label(canvas: &mut dyn OverlayCanvas, text: &str, (x, y): (f64, f64)) {
    canvas.stroke_text(text, x, y);
    canvas.fill_text(text, x, y);
}

#[cfg(test)]
mod tests {
    use measure_shared::PixelDims;

    use super::*;
    use crate::testing::{CanvasCall, RecordingCanvas};

    #[test]
    fn calibration_draws_rect_and_markers_without_labels() {
        let mut canvas = RecordingCanvas::default();
        let overlay = Overlay::calibration(&CalibrationRect {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
            pixel_ratio: None,
        });
        render_overlay(&mut canvas, &overlay);

        let calls = canvas.calls();
        assert_eq!(calls[0], CanvasCall::Clear);
        assert_eq!(canvas.rects(), vec![(10.0, 20.0, 100.0, 50.0)]);
        assert_eq!(
            canvas.markers(),
            vec![(10.0, 20.0), (110.0, 20.0), (110.0, 70.0), (10.0, 70.0)]
        );
        assert!(canvas.filled_labels().is_empty());
        assert!(canvas.outlined_labels().is_empty());
    }

    #[test]
    fn measurement_places_labels_relative_to_pixel_rect() {
        let mut canvas = RecordingCanvas::default();
        let overlay = Overlay::measurement(&Measurement {
            width: 30.0,
            height: 15.0,
            pixel_dims: PixelDims {
                x: 5.0,
                y: 5.0,
                w: 60.0,
                h: 40.0,
            },
        });
        render_overlay(&mut canvas, &overlay);

        assert_eq!(canvas.rects(), vec![(5.0, 5.0, 60.0, 40.0)]);
        assert_eq!(canvas.markers().len(), 4);
        assert_eq!(
            canvas.filled_labels(),
            vec![
                ("30cm".to_string(), 35.0, -5.0),
                ("15cm".to_string(), 85.0, 25.0)
            ]
        );
        assert_eq!(canvas.outlined_labels(), canvas.filled_labels());
    }

    #[test]
    fn each_label_is_outlined_before_it_is_filled() {
        let mut canvas = RecordingCanvas::default();
        let overlay = Overlay::Measurement {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            width_cm: 1.5,
            height_cm: 2.0,
        };
        render_overlay(&mut canvas, &overlay);

        let text_calls: Vec<_> = canvas
            .calls()
            .into_iter()
            .filter(|call| {
                matches!(call, CanvasCall::StrokeText { .. } | CanvasCall::FillText { .. })
            })
            .collect();
        assert!(matches!(&text_calls[0], CanvasCall::StrokeText { text, .. } if text == "1.5cm"));
        assert!(matches!(&text_calls[1], CanvasCall::FillText { text, .. } if text == "1.5cm"));
        assert!(matches!(&text_calls[2], CanvasCall::StrokeText { text, .. } if text == "2cm"));
        assert!(matches!(&text_calls[3], CanvasCall::FillText { text, .. } if text == "2cm"));
    }

    #[test]
    fn consecutive_renders_never_accumulate() {
        let mut canvas = RecordingCanvas::default();
        render_overlay(
            &mut canvas,
            &Overlay::Calibration(Rect::new(1.0, 1.0, 2.0, 2.0)),
        );
        render_overlay(
            &mut canvas,
            &Overlay::Calibration(Rect::new(3.0, 3.0, 4.0, 4.0)),
        );
        assert_eq!(canvas.rects(), vec![(3.0, 3.0, 4.0, 4.0)]);
    }

    #[test]
    fn non_finite_geometry_only_clears() {
        let mut canvas = RecordingCanvas::default();
        render_overlay(
            &mut canvas,
            &Overlay::Calibration(Rect::new(f64::NAN, 0.0, 1.0, 1.0)),
        );
        assert_eq!(canvas.calls(), vec![CanvasCall::Clear]);
    }
}
