use std::sync::Arc;

use measure_shared::{MeasurementRecord, Room};
use tokio::sync::RwLock;

use crate::detector::Detector;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub detector: Arc<dyn Detector>,
}

impl AppState {
    pub fn new(detector: impl Detector + 'static) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            detector: Arc::new(detector),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub reference_width: f64,
    pub reference_height: f64,
    /// Centimetres per pixel.
    pub pixel_ratio: f64,
}

/// Everything the backend remembers; lives until the process exits.
#[derive(Debug, Default)]
pub struct Session {
    pub calibration: Option<Calibration>,
    pub measurements: Vec<MeasurementRecord>,
    pub room: Room,
    pub scanning: bool,
}
