use std::cell::{Ref, RefCell};

use measure_shared::{CalibrationRect, Measurement, Room};

use crate::error::{CommandError, TransportError};
use crate::measurements::{render_list, RefreshSequencer};
use crate::net::Api;
use crate::ports::{Controls, ListSurface, OverlayCanvas, Ports};
use crate::reference::ReferenceSpec;
use crate::render::{clear_overlay, render_overlay, Overlay};
use crate::state::{ActionSlot, Phase, WorkflowState};

#[derive(Clone, Debug, PartialEq)]
pub enum ScanOutcome {
    Started,
    Stopped(Room),
    /// The toggle was pressed again before the start resolved.
    Cancelled,
}

/// Runs each user action against the backend and owns the workflow state.
///
/// Methods take `&self` so one action can be awaiting the network while
/// another slot is triggered; no `RefCell` borrow is held across an await.
pub struct Dispatcher<A: Api> {
    api: A,
    state: RefCell<WorkflowState>,
    refresh: RefCell<RefreshSequencer>,
    overlay: RefCell<Box<dyn OverlayCanvas>>,
    list: RefCell<Box<dyn ListSurface>>,
    controls: RefCell<Box<dyn Controls>>,
}

struct SlotGuard<'a, A: Api> {
    dispatcher: &'a Dispatcher<A>,
    slot: ActionSlot,
}

impl<A: Api> Drop for SlotGuard<'_, A> {
    fn drop(&mut self) {
        self.dispatcher.state.borrow_mut().release(self.slot);
        self.dispatcher
            .controls
            .borrow_mut()
            .set_enabled(self.slot, true);
    }
}

impl<A: Api> Dispatcher<A> {
    pub fn new(api: A, ports: Ports) -> Self {
        Self {
            api,
            state: RefCell::new(WorkflowState::new()),
            refresh: RefCell::new(RefreshSequencer::default()),
            overlay: RefCell::new(ports.overlay),
            list: RefCell::new(ports.list),
            controls: RefCell::new(ports.controls),
        }
    }

    pub fn state(&self) -> Ref<'_, WorkflowState> {
        self.state.borrow()
    }

    pub fn open_reference_setup(&self) {
        self.controls.borrow_mut().show_reference_setup(true);
    }

    pub fn show_ready(&self) {
        let text = if self.state.borrow().calibrated() {
            "Ready to measure"
        } else {
            "Ready to calibrate"
        };
        self.set_status(self.resting_phase(), text);
    }

    pub async fn calibrate(&self, spec: &ReferenceSpec) -> Result<CalibrationRect, CommandError> {
        let result = self.run_calibrate(spec).await;
        self.report_result(ActionSlot::Calibrate, &result);
        result
    }

    pub async fn measure(&self) -> Result<Measurement, CommandError> {
        let result = self.run_measure().await;
        self.report_result(ActionSlot::Measure, &result);
        result
    }

    pub async fn toggle_scan(&self) -> Result<ScanOutcome, CommandError> {
        let (scanning, start_pending) = {
            let state = self.state.borrow();
            (state.scanning(), state.scan_start_pending())
        };
        let result = if start_pending {
            Ok(self.cancel_scan_start())
        } else if scanning {
            self.run_stop_scan().await
        } else {
            self.run_start_scan().await
        };
        self.report_result(ActionSlot::Scan, &result);
        result
    }

    pub async fn reset(&self) -> Result<(), CommandError> {
        let result = self.run_reset().await;
        self.report_result(ActionSlot::Reset, &result);
        result
    }

    /// Re-fetches the authoritative list. Returns false when a newer
    /// refresh was already rendered and this response was dropped.
    pub async fn refresh(&self) -> Result<bool, CommandError> {
        let seq = self.refresh.borrow_mut().issue();
        let snapshot = self.api.measurements().await?;
        if !self.refresh.borrow_mut().accept(seq) {
            log::debug!("Dropping superseded measurement list #{seq}");
            return Ok(false);
        }
        render_list(&mut **self.list.borrow_mut(), &snapshot);
        Ok(true)
    }

    async fn run_calibrate(&self, spec: &ReferenceSpec) -> Result<CalibrationRect, CommandError> {
        let request = spec.validate()?;
        let guard = self.acquire(ActionSlot::Calibrate, true)?;
        self.set_status(Phase::Calibrating, "Calibrating...");
        log::info!("Calibrating with {}", request.reference_type.as_str());

        let body = self
            .api
            .calibrate(&request)
            .await?
            .into_result()
            .map_err(CommandError::Server)?;
        let rect = body
            .calibration
            .ok_or_else(|| TransportError::Malformed("missing calibration".into()))?;

        self.state.borrow_mut().commit_calibration();
        self.draw(&Overlay::calibration(&rect));
        self.set_status(self.resting_phase(), "Calibrated! Ready to measure");
        self.controls.borrow_mut().show_reference_setup(false);
        drop(guard);

        self.refresh_logged().await;
        Ok(rect)
    }

    async fn run_measure(&self) -> Result<Measurement, CommandError> {
        self.state.borrow().require_calibrated()?;
        let guard = self.acquire(ActionSlot::Measure, true)?;
        let epoch = self.state.borrow().calibration_epoch();
        self.set_status(Phase::Measuring, "Measuring...");

        let body = self
            .api
            .measure()
            .await?
            .into_result()
            .map_err(CommandError::Server)?;
        let measurement = body
            .measurement
            .ok_or_else(|| TransportError::Malformed("missing measurement".into()))?;
        drop(guard);

        let stale = {
            let state = self.state.borrow();
            !state.calibrated() || state.calibration_epoch() != epoch
        };
        if stale {
            // The backend still recorded it; only the overlay is withheld.
            self.refresh_logged().await;
            return Err(CommandError::Stale);
        }

        self.draw(&Overlay::measurement(&measurement));
        self.set_status(
            self.resting_phase(),
            &format!(
                "Object: {}cm x {}cm",
                measurement.width, measurement.height
            ),
        );
        self.refresh_logged().await;
        Ok(measurement)
    }

    async fn run_start_scan(&self) -> Result<ScanOutcome, CommandError> {
        self.state.borrow().require_calibrated()?;
        // Left enabled: pressing it again while pending cancels the start.
        let guard = self.acquire(ActionSlot::Scan, false)?;
        let generation = self.state.borrow_mut().begin_scan_start();
        self.controls.borrow_mut().set_scan_label(true);
        self.set_status(Phase::Scanning, "Mapping room...");

        let outcome = match self.api.start_scan().await {
            Ok(response) => response.into_result().map_err(CommandError::Server),
            Err(error) => Err(error.into()),
        };
        if let Err(error) = outcome {
            let scanning = {
                let mut state = self.state.borrow_mut();
                state.abandon_scan_start();
                state.scanning()
            };
            self.controls.borrow_mut().set_scan_label(scanning);
            return Err(error);
        }

        if self.state.borrow_mut().commit_scan_started(generation) {
            return Ok(ScanOutcome::Started);
        }

        log::info!("Scan start superseded before it resolved; stopping backend scan");
        self.controls
            .borrow_mut()
            .set_enabled(ActionSlot::Scan, false);
        let room = match self.api.stop_scan().await {
            Ok(response) => match response.into_result() {
                Ok(body) => body.room,
                Err(message) => {
                    log::warn!("Backend refused to stop superseded scan: {message}");
                    None
                }
            },
            Err(error) => {
                log::error!("Failed to stop superseded scan: {error}");
                None
            }
        };
        drop(guard);

        // The backend completed the scan it had started, so the room it
        // recorded is what the list will show.
        let outcome = match room {
            Some(room) => {
                self.set_status(
                    self.resting_phase(),
                    &format!("Room: {}cm x {}cm", room.width, room.height),
                );
                Ok(ScanOutcome::Stopped(room))
            }
            None => Err(CommandError::Stale),
        };
        self.refresh_logged().await;
        outcome
    }

    fn cancel_scan_start(&self) -> ScanOutcome {
        self.state.borrow_mut().cancel_scan_start();
        self.controls.borrow_mut().set_scan_label(false);
        self.set_status(self.resting_phase(), "Room scan cancelled");
        ScanOutcome::Cancelled
    }

    async fn run_stop_scan(&self) -> Result<ScanOutcome, CommandError> {
        let guard = self.acquire(ActionSlot::Scan, true)?;
        self.set_status(Phase::Scanning, "Finishing room scan...");

        let body = self
            .api
            .stop_scan()
            .await?
            .into_result()
            .map_err(CommandError::Server)?;
        let room = body
            .room
            .ok_or_else(|| TransportError::Malformed("missing room".into()))?;

        let applied = self.state.borrow_mut().commit_scan_stopped();
        drop(guard);
        if !applied {
            self.refresh_logged().await;
            return Err(CommandError::Stale);
        }

        self.controls.borrow_mut().set_scan_label(false);
        self.set_status(
            self.resting_phase(),
            &format!("Room: {}cm x {}cm", room.width, room.height),
        );
        self.refresh_logged().await;
        Ok(ScanOutcome::Stopped(room))
    }

    async fn run_reset(&self) -> Result<(), CommandError> {
        let guard = self.acquire(ActionSlot::Reset, true)?;
        self.api
            .reset()
            .await?
            .into_result()
            .map_err(CommandError::Server)?;

        clear_overlay(&mut **self.overlay.borrow_mut());
        self.set_status(self.resting_phase(), "Measurements cleared");
        drop(guard);

        self.refresh_logged().await;
        Ok(())
    }

    fn acquire(&self, slot: ActionSlot, disable: bool) -> Result<SlotGuard<'_, A>, CommandError> {
        if !self.state.borrow_mut().try_acquire(slot) {
            return Err(CommandError::Busy(slot));
        }
        if disable {
            self.controls.borrow_mut().set_enabled(slot, false);
        }
        Ok(SlotGuard {
            dispatcher: self,
            slot,
        })
    }

    async fn refresh_logged(&self) {
        if let Err(error) = self.refresh().await {
            log::error!("Failed to refresh measurements: {error}");
        }
    }

    fn draw(&self, overlay: &Overlay) {
        render_overlay(&mut **self.overlay.borrow_mut(), overlay);
    }

    fn resting_phase(&self) -> Phase {
        if self.state.borrow().scanning() {
            Phase::Scanning
        } else {
            Phase::Idle
        }
    }

    fn set_status(&self, phase: Phase, text: &str) {
        self.controls.borrow_mut().set_status(phase, text);
    }

    fn report_result<T>(&self, slot: ActionSlot, result: &Result<T, CommandError>) {
        if let Err(error) = result {
            self.report(slot, error);
        }
    }

    fn report(&self, slot: ActionSlot, error: &CommandError) {
        let failure = failure_phrase(slot);
        if error.is_local() {
            log::debug!("{slot:?} rejected before any request: {error}");
        }
        match error {
            CommandError::Busy(_) => {
                log::debug!("Ignoring {slot:?}: a request is already in flight");
            }
            CommandError::Stale => {
                log::info!("{slot:?} response arrived after the workflow changed; not applied");
            }
            CommandError::Validation(error) => {
                self.set_status(Phase::Error, failure);
                self.controls
                    .borrow_mut()
                    .notify(&format!("Please enter valid reference dimensions: {error}."));
            }
            CommandError::Precondition(_) => {
                self.set_status(Phase::Error, failure);
                let mut controls = self.controls.borrow_mut();
                controls.notify("Please calibrate the camera first using a reference object.");
                controls.show_reference_setup(true);
            }
            CommandError::Server(message) => {
                log::warn!("{failure}: {message}");
                self.set_status(Phase::Error, failure);
                self.controls
                    .borrow_mut()
                    .notify(&format!("{failure}: {message}"));
            }
            CommandError::Transport(error) => {
                log::error!("{failure}: {error}");
                self.set_status(Phase::Error, failure);
            }
        }
    }
}

fn failure_phrase(slot: ActionSlot) -> &'static str {
    match slot {
        ActionSlot::Calibrate => "Calibration failed",
        ActionSlot::Measure => "Measurement failed",
        ActionSlot::Scan => "Room scan failed",
        ActionSlot::Reset => "Reset failed",
    }
}
