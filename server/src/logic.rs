use measure_shared::{
    CalibrateRequest, CalibrationRect, Measurement, MeasurementRecord, MeasurementsSnapshot,
    ReferenceType, Room,
};
use rand::Rng;
use thiserror::Error;

use crate::detector::Detector;
use crate::state::{Calibration, Session};

pub const ROOM_SIDE_RANGE_CM: std::ops::Range<f64> = 300.0..500.0;
/// Largest side representable at 2 dp inside `ROOM_SIDE_RANGE_CM`.
const ROOM_SIDE_MAX_CM: f64 = 499.99;
pub const OBJECT_KIND: &str = "Object";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("custom reference needs a positive width and height")]
    InvalidReference,
    #[error("could not detect the reference object")]
    ReferenceNotFound,
    #[error("system not calibrated")]
    NotCalibrated,
    #[error("no object detected")]
    ObjectNotFound,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds a sampled side to 2 dp without leaving the half-open range.
fn room_side(sample: f64) -> f64 {
    round2(sample).clamp(ROOM_SIDE_RANGE_CM.start, ROOM_SIDE_MAX_CM)
}

pub fn reference_size(request: &CalibrateRequest) -> Result<(f64, f64), SessionError> {
    if let Some(size) = request.reference_type.preset_size() {
        return Ok(size);
    }
    match (request.width, request.height) {
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => Ok((width, height)),
        _ => Err(SessionError::InvalidReference),
    }
}

/// Replaces any previous calibration. Measurements already taken keep the
/// ratio they were computed with.
pub fn calibrate(
    session: &mut Session,
    detector: &dyn Detector,
    request: &CalibrateRequest,
) -> Result<CalibrationRect, SessionError> {
    let (reference_width, reference_height) = reference_size(request)?;
    let rect = detector
        .locate_reference()
        .filter(|rect| rect.w > 0.0 && rect.h > 0.0)
        .ok_or(SessionError::ReferenceNotFound)?;
    let pixel_ratio = (reference_width / rect.w + reference_height / rect.h) / 2.0;
    session.calibration = Some(Calibration {
        reference_width,
        reference_height,
        pixel_ratio,
    });
    if request.reference_type == ReferenceType::Custom {
        log::info!("Calibrated against custom {reference_width}x{reference_height}cm reference");
    } else {
        log::info!("Calibrated against {}", request.reference_type.as_str());
    }
    Ok(CalibrationRect {
        x: rect.x,
        y: rect.y,
        width: rect.w,
        height: rect.h,
        pixel_ratio: Some(pixel_ratio),
    })
}

pub fn measure(
    session: &mut Session,
    detector: &dyn Detector,
    timestamp: f64,
) -> Result<Measurement, SessionError> {
    let calibration = session.calibration.ok_or(SessionError::NotCalibrated)?;
    log::debug!(
        "Measuring against {}x{}cm reference ({} cm/px)",
        calibration.reference_width,
        calibration.reference_height,
        calibration.pixel_ratio
    );
    let pixel_dims = detector
        .locate_object()
        .ok_or(SessionError::ObjectNotFound)?;
    let width = round2(pixel_dims.w * calibration.pixel_ratio);
    let height = round2(pixel_dims.h * calibration.pixel_ratio);
    session.measurements.push(MeasurementRecord {
        kind: OBJECT_KIND.to_string(),
        width,
        height,
        timestamp: Some(timestamp),
    });
    Ok(Measurement {
        width,
        height,
        pixel_dims,
    })
}

pub fn start_scan(session: &mut Session) {
    session.scanning = true;
}

/// Ends the scan and records a simulated room size.
pub fn stop_scan(session: &mut Session, rng: &mut impl Rng) -> Room {
    session.scanning = false;
    let width = room_side(rng.gen_range(ROOM_SIDE_RANGE_CM));
    let height = room_side(rng.gen_range(ROOM_SIDE_RANGE_CM));
    let room = Room {
        width,
        height,
        area: round2(width * height / 10_000.0),
    };
    session.room = room;
    room
}

/// Clears measurements and room; calibration survives.
pub fn reset(session: &mut Session) {
    session.measurements.clear();
    session.room = Room::default();
}

pub fn snapshot(session: &Session) -> MeasurementsSnapshot {
    MeasurementsSnapshot {
        measurements: session.measurements.clone(),
        room: session.room,
    }
}
