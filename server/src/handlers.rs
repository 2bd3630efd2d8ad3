use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use measure_shared::{
    CalibrateBody, CalibrateRequest, CalibrateResponse, EmptyBody, Envelope, MeasureBody,
    MeasureResponse, MeasurementsSnapshot, ResetResponse, ScanBody, ScanResponse,
};

use crate::logic;
use crate::state::AppState;

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

pub async fn calibrate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalibrateRequest>, JsonRejection>,
) -> Json<CalibrateResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::warn!("Rejected calibrate body: {rejection}");
            return Json(Envelope::failure(rejection.body_text()));
        }
    };
    let mut session = state.session.write().await;
    match logic::calibrate(&mut session, state.detector.as_ref(), &request) {
        Ok(calibration) => Json(Envelope::ok(CalibrateBody {
            calibration: Some(calibration),
        })),
        Err(error) => {
            log::warn!("Calibration failed: {error}");
            Json(Envelope::failure(error.to_string()))
        }
    }
}

pub async fn measure_handler(State(state): State<AppState>) -> Json<MeasureResponse> {
    let mut session = state.session.write().await;
    match logic::measure(&mut session, state.detector.as_ref(), now_seconds()) {
        Ok(measurement) => {
            log::info!(
                "Measured object {}cm x {}cm",
                measurement.width,
                measurement.height
            );
            Json(Envelope::ok(MeasureBody {
                measurement: Some(measurement),
            }))
        }
        Err(error) => {
            log::warn!("Measurement failed: {error}");
            Json(Envelope::failure(error.to_string()))
        }
    }
}

pub async fn scan_start_handler(State(state): State<AppState>) -> Json<ScanResponse> {
    let mut session = state.session.write().await;
    logic::start_scan(&mut session);
    log::info!("Room scan started");
    Json(Envelope::ok(ScanBody {
        scanning: Some(true),
        room: None,
    }))
}

pub async fn scan_stop_handler(State(state): State<AppState>) -> Json<ScanResponse> {
    let mut session = state.session.write().await;
    let room = logic::stop_scan(&mut session, &mut rand::thread_rng());
    log::info!("Room scan stopped: {}cm x {}cm", room.width, room.height);
    Json(Envelope::ok(ScanBody {
        scanning: Some(false),
        room: Some(room),
    }))
}

pub async fn reset_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut session = state.session.write().await;
    logic::reset(&mut session);
    log::info!("Measurements cleared");
    Json(Envelope::ok(EmptyBody {}))
}

pub async fn measurements_handler(State(state): State<AppState>) -> Json<MeasurementsSnapshot> {
    let session = state.session.read().await;
    Json(logic::snapshot(&session))
}
