//! In-memory ports and backend used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use measure_shared::{
    CalibrateBody, CalibrateRequest, CalibrateResponse, CalibrationRect, EmptyBody, Envelope,
    MeasureBody, MeasureResponse, Measurement, MeasurementRecord, MeasurementsSnapshot, PixelDims,
    ResetResponse, Room, ScanBody, ScanResponse,
};

use crate::error::TransportError;
use crate::net::Api;
use crate::ports::{Controls, ListRow, ListSurface, OverlayCanvas};
use crate::state::{ActionSlot, Phase};

#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCall {
    Clear,
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    FillCircle { x: f64, y: f64, radius: f64 },
    StrokeText { text: String, x: f64, y: f64 },
    FillText { text: String, x: f64, y: f64 },
}

#[derive(Clone, Default)]
pub struct RecordingCanvas {
    calls: Rc<RefCell<Vec<CanvasCall>>>,
}

impl RecordingCanvas {
    pub fn calls(&self) -> Vec<CanvasCall> {
        self.calls.borrow().clone()
    }

    /// Calls since the last clear, i.e. what is currently visible.
    fn visible(&self) -> Vec<CanvasCall> {
        let calls = self.calls.borrow();
        let start = calls
            .iter()
            .rposition(|call| *call == CanvasCall::Clear)
            .map(|index| index + 1)
            .unwrap_or(0);
        calls[start..].to_vec()
    }

    pub fn rects(&self) -> Vec<(f64, f64, f64, f64)> {
        self.visible()
            .into_iter()
            .filter_map(|call| match call {
                CanvasCall::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                } => Some((x, y, width, height)),
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<(f64, f64)> {
        self.visible()
            .into_iter()
            .filter_map(|call| match call {
                CanvasCall::FillCircle { x, y, .. } => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn filled_labels(&self) -> Vec<(String, f64, f64)> {
        self.visible()
            .into_iter()
            .filter_map(|call| match call {
                CanvasCall::FillText { text, x, y } => Some((text, x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn outlined_labels(&self) -> Vec<(String, f64, f64)> {
        self.visible()
            .into_iter()
            .filter_map(|call| match call {
                CanvasCall::StrokeText { text, x, y } => Some((text, x, y)),
                _ => None,
            })
            .collect()
    }
}

impl OverlayCanvas for RecordingCanvas {
    fn clear(&mut self) {
        self.calls.borrow_mut().push(CanvasCall::Clear);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, _line_width: f64) {
        self.calls.borrow_mut().push(CanvasCall::StrokeRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.calls
            .borrow_mut()
            .push(CanvasCall::FillCircle { x, y, radius });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.calls.borrow_mut().push(CanvasCall::StrokeText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.calls.borrow_mut().push(CanvasCall::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }
}

#[derive(Clone, Default)]
pub struct RecordingList {
    renders: Rc<RefCell<Vec<Vec<ListRow>>>>,
}

impl RecordingList {
    pub fn renders(&self) -> usize {
        self.renders.borrow().len()
    }

    pub fn last_rows(&self) -> Vec<ListRow> {
        self.renders.borrow().last().cloned().unwrap_or_default()
    }
}

impl ListSurface for RecordingList {
    fn show(&mut self, rows: &[ListRow]) {
        self.renders.borrow_mut().push(rows.to_vec());
    }
}

#[derive(Default)]
struct ControlsLog {
    statuses: Vec<(Phase, String)>,
    notices: Vec<String>,
    enabled: HashMap<ActionSlot, bool>,
    scan_label: Option<bool>,
    reference_visible: Option<bool>,
}

#[derive(Clone, Default)]
pub struct RecordingControls {
    log: Rc<RefCell<ControlsLog>>,
}

impl RecordingControls {
    pub fn last_phase(&self) -> Option<Phase> {
        self.log.borrow().statuses.last().map(|(phase, _)| *phase)
    }

    pub fn last_status(&self) -> Option<String> {
        self.log.borrow().statuses.last().map(|(_, text)| text.clone())
    }

    pub fn notices(&self) -> Vec<String> {
        self.log.borrow().notices.clone()
    }

    pub fn enabled(&self, slot: ActionSlot) -> Option<bool> {
        self.log.borrow().enabled.get(&slot).copied()
    }

    pub fn scan_label(&self) -> Option<bool> {
        self.log.borrow().scan_label
    }

    pub fn reference_visible(&self) -> Option<bool> {
        self.log.borrow().reference_visible
    }
}

impl Controls for RecordingControls {
    fn set_status(&mut self, phase: Phase, text: &str) {
        self.log
            .borrow_mut()
            .statuses
            .push((phase, text.to_string()));
    }

    fn notify(&mut self, message: &str) {
        self.log.borrow_mut().notices.push(message.to_string());
    }

    fn set_enabled(&mut self, slot: ActionSlot, enabled: bool) {
        self.log.borrow_mut().enabled.insert(slot, enabled);
    }

    fn set_scan_label(&mut self, scanning: bool) {
        self.log.borrow_mut().scan_label = Some(scanning);
    }

    fn show_reference_setup(&mut self, visible: bool) {
        self.log.borrow_mut().reference_visible = Some(visible);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Calibrate,
    Measure,
    StartScan,
    StopScan,
    Reset,
    Measurements,
}

pub enum Failure {
    Server(String),
    Transport,
}

struct Backend {
    calls: Vec<Endpoint>,
    calibration: CalibrationRect,
    measurement: Measurement,
    room: Room,
    records: Vec<MeasurementRecord>,
    current_room: Room,
    scanning: bool,
    failures: HashMap<Endpoint, VecDeque<Failure>>,
    holds: HashMap<Endpoint, VecDeque<oneshot::Receiver<()>>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            calibration: CalibrationRect {
                x: 10.0,
                y: 20.0,
                width: 100.0,
                height: 50.0,
                pixel_ratio: Some(0.5),
            },
            measurement: Measurement {
                width: 30.0,
                height: 15.0,
                pixel_dims: PixelDims {
                    x: 5.0,
                    y: 5.0,
                    w: 60.0,
                    h: 40.0,
                },
            },
            room: Room {
                width: 420.0,
                height: 350.5,
                area: 14.72,
            },
            records: Vec::new(),
            current_room: Room::default(),
            scanning: false,
            failures: HashMap::new(),
            holds: HashMap::new(),
        }
    }
}

/// Backend double. State changes when a request is received; the reply can
/// be held back with [`FakeApi::hold`] to model a slow network.
#[derive(Clone, Default)]
pub struct FakeApi {
    backend: Rc<RefCell<Backend>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Endpoint> {
        self.backend.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.backend.borrow_mut().calls.clear();
    }

    pub fn backend_scanning(&self) -> bool {
        self.backend.borrow().scanning
    }

    pub fn fail_next(&self, endpoint: Endpoint, failure: Failure) {
        self.backend
            .borrow_mut()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(failure);
    }

    /// Delays the next reply from `endpoint` until the sender fires.
    pub fn hold(&self, endpoint: Endpoint) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.backend
            .borrow_mut()
            .holds
            .entry(endpoint)
            .or_default()
            .push_back(receiver);
        sender
    }

    fn receive(&self, endpoint: Endpoint) -> (Option<Failure>, Option<oneshot::Receiver<()>>) {
        let mut backend = self.backend.borrow_mut();
        backend.calls.push(endpoint);
        let failure = backend
            .failures
            .get_mut(&endpoint)
            .and_then(|queue| queue.pop_front());
        let hold = backend
            .holds
            .get_mut(&endpoint)
            .and_then(|queue| queue.pop_front());
        (failure, hold)
    }

    async fn reply<T: Default>(
        &self,
        endpoint: Endpoint,
        handle: impl FnOnce(&mut Backend) -> Envelope<T>,
    ) -> Result<Envelope<T>, TransportError> {
        let (failure, hold) = self.receive(endpoint);
        let response = match failure {
            Some(Failure::Transport) => Err(TransportError::Network("connection refused".into())),
            Some(Failure::Server(message)) => Ok(Envelope::failure(message)),
            None => {
                let mut backend = self.backend.borrow_mut();
                Ok(handle(&mut *backend))
            }
        };
        if let Some(hold) = hold {
            hold.await
                .map_err(|_| TransportError::Network("request aborted".into()))?;
        }
        response
    }
}

#[async_trait(?Send)]
impl Api for FakeApi {
    async fn calibrate(
        &self,
        _request: &CalibrateRequest,
    ) -> Result<CalibrateResponse, TransportError> {
        self.reply(Endpoint::Calibrate, |backend| {
            Envelope::ok(CalibrateBody {
                calibration: Some(backend.calibration),
            })
        })
        .await
    }

    async fn measure(&self) -> Result<MeasureResponse, TransportError> {
        self.reply(Endpoint::Measure, |backend| {
            let measurement = backend.measurement;
            backend.records.push(MeasurementRecord {
                kind: "Object".to_string(),
                width: measurement.width,
                height: measurement.height,
                timestamp: None,
            });
            Envelope::ok(MeasureBody {
                measurement: Some(measurement),
            })
        })
        .await
    }

    async fn start_scan(&self) -> Result<ScanResponse, TransportError> {
        self.reply(Endpoint::StartScan, |backend| {
            backend.scanning = true;
            Envelope::ok(ScanBody {
                scanning: Some(true),
                room: None,
            })
        })
        .await
    }

    async fn stop_scan(&self) -> Result<ScanResponse, TransportError> {
        self.reply(Endpoint::StopScan, |backend| {
            backend.scanning = false;
            backend.current_room = backend.room;
            Envelope::ok(ScanBody {
                scanning: Some(false),
                room: Some(backend.room),
            })
        })
        .await
    }

    async fn reset(&self) -> Result<ResetResponse, TransportError> {
        self.reply(Endpoint::Reset, |backend| {
            backend.records.clear();
            backend.current_room = Room::default();
            Envelope::ok(EmptyBody {})
        })
        .await
    }

    async fn measurements(&self) -> Result<MeasurementsSnapshot, TransportError> {
        let (failure, hold) = self.receive(Endpoint::Measurements);
        let snapshot = {
            let backend = self.backend.borrow();
            MeasurementsSnapshot {
                measurements: backend.records.clone(),
                room: backend.current_room,
            }
        };
        if let Some(hold) = hold {
            hold.await
                .map_err(|_| TransportError::Network("request aborted".into()))?;
        }
        match failure {
            Some(_) => Err(TransportError::Network("connection refused".into())),
            None => Ok(snapshot),
        }
    }
}
