use std::collections::HashSet;

use crate::error::PreconditionError;

/// One per user control; a slot holds at most one request in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionSlot {
    Calibrate,
    Measure,
    Scan,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Calibrating,
    Measuring,
    Scanning,
    Error,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Calibrating => "calibrating",
            Phase::Measuring => "measuring",
            Phase::Scanning => "scanning",
            Phase::Error => "error",
        }
    }
}

/// Session state shared by every action. Only the dispatcher mutates it,
/// and only between awaits.
#[derive(Debug, Default)]
pub struct WorkflowState {
    calibrated: bool,
    scanning: bool,
    calibration_epoch: u64,
    scan_generation: u64,
    scan_start_pending: bool,
    busy: HashSet<ActionSlot>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn scanning(&self) -> bool {
        self.scanning
    }

    pub fn calibration_epoch(&self) -> u64 {
        self.calibration_epoch
    }

    pub fn scan_start_pending(&self) -> bool {
        self.scan_start_pending
    }

    pub fn invariant_holds(&self) -> bool {
        !self.scanning || self.calibrated
    }

    pub fn require_calibrated(&self) -> Result<(), PreconditionError> {
        if self.calibrated {
            Ok(())
        } else {
            Err(PreconditionError::NotCalibrated)
        }
    }

    pub fn is_busy(&self, slot: ActionSlot) -> bool {
        self.busy.contains(&slot)
    }

    /// Returns false when the slot already has a request in flight.
    pub fn try_acquire(&mut self, slot: ActionSlot) -> bool {
        self.busy.insert(slot)
    }

    pub fn release(&mut self, slot: ActionSlot) {
        self.busy.remove(&slot);
    }

    pub fn commit_calibration(&mut self) {
        self.calibrated = true;
        self.calibration_epoch += 1;
    }

    /// Records a scan start being sent; the returned generation must be
    /// presented back when the response arrives.
    pub fn begin_scan_start(&mut self) -> u64 {
        self.scan_generation += 1;
        self.scan_start_pending = true;
        self.scan_generation
    }

    /// The user toggled again before the start resolved. The scan slot stays
    /// held until that start response arrives.
    pub fn cancel_scan_start(&mut self) {
        self.scan_generation += 1;
        self.scan_start_pending = false;
    }

    /// Applies a successful scan start only if nothing superseded it.
    pub fn commit_scan_started(&mut self, generation: u64) -> bool {
        self.scan_start_pending = false;
        if generation != self.scan_generation || !self.calibrated || self.scanning {
            return false;
        }
        self.scanning = true;
        debug_assert!(self.invariant_holds());
        true
    }

    pub fn abandon_scan_start(&mut self) {
        self.scan_start_pending = false;
    }

    pub fn commit_scan_stopped(&mut self) -> bool {
        if !self.scanning {
            return false;
        }
        self.scanning = false;
        true
    }
}
