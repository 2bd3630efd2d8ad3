use serde::{Deserialize, Serialize};

mod reference;

pub use reference::{ReferenceType, CREDIT_CARD_CM, A4_PAPER_CM};

pub const CALIBRATE_PATH: &str = "/api/calibrate";
pub const MEASURE_PATH: &str = "/api/measure";
pub const SCAN_START_PATH: &str = "/api/scan/start";
pub const SCAN_STOP_PATH: &str = "/api/scan/stop";
pub const RESET_PATH: &str = "/api/reset";
pub const MEASUREMENTS_PATH: &str = "/api/measurements";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CalibrateRequest {
    #[serde(rename = "referenceType")]
    pub reference_type: ReferenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Where the reference object was found, in video pixels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CalibrationRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Centimetres per pixel derived by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PixelDims {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub width: f64,
    pub height: f64,
    pub pixel_dims: PixelDims,
}

/// Aggregate room size. A zero width means no scan has completed yet.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Room {
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl Room {
    pub fn is_measured(&self) -> bool {
        self.width > 0.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MeasurementRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MeasurementsSnapshot {
    #[serde(default)]
    pub measurements: Vec<MeasurementRecord>,
    #[serde(default)]
    pub room: Room,
}

/// Common shape of every mutating response: `success`, an `error` on
/// failure, and the endpoint's own fields flattened alongside.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            error: None,
            body,
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            Ok(self.body)
        } else {
            Err(self.error.unwrap_or_else(|| "unknown error".to_string()))
        }
    }
}

impl<T: Default> Envelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            body: T::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CalibrateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationRect>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MeasureBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<Measurement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ScanBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EmptyBody {}

pub type CalibrateResponse = Envelope<CalibrateBody>;
pub type MeasureResponse = Envelope<MeasureBody>;
pub type ScanResponse = Envelope<ScanBody>;
pub type ResetResponse = Envelope<EmptyBody>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_request_uses_camel_case_type_field() {
        let request = CalibrateRequest {
            reference_type: ReferenceType::Custom,
            width: Some(10.0),
            height: Some(4.5),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["referenceType"], "custom");
        assert_eq!(json["width"], 10.0);
        assert_eq!(json["height"], 4.5);
    }

    #[test]
    fn preset_request_omits_dimensions() {
        let request = CalibrateRequest {
            reference_type: ReferenceType::CreditCard,
            width: None,
            height: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"referenceType":"credit-card"}"#);
    }

    #[test]
    fn failed_envelope_yields_server_message() {
        let response: MeasureResponse =
            serde_json::from_str(r#"{"success":false,"error":"no object detected"}"#).unwrap();
        assert_eq!(response.into_result(), Err("no object detected".to_string()));
    }

    #[test]
    fn measure_envelope_parses_pixel_dims() {
        let response: MeasureResponse = serde_json::from_str(
            r#"{"success":true,"measurement":{"width":30,"height":15,"pixel_dims":{"x":5,"y":5,"w":60,"h":40}}}"#,
        )
        .unwrap();
        let body = response.into_result().unwrap();
        let measurement = body.measurement.unwrap();
        assert_eq!(measurement.pixel_dims.w, 60.0);
        assert_eq!(measurement.width, 30.0);
    }

    #[test]
    fn scan_start_envelope_tolerates_extra_fields() {
        let response: ScanResponse =
            serde_json::from_str(r#"{"success":true,"scanning":true}"#).unwrap();
        let body = response.into_result().unwrap();
        assert_eq!(body.scanning, Some(true));
        assert!(body.room.is_none());
    }

    #[test]
    fn snapshot_record_reads_type_field() {
        let snapshot: MeasurementsSnapshot = serde_json::from_str(
            r#"{"measurements":[{"type":"Object","width":12.5,"height":3,"timestamp":1.0}],"room":{"width":0,"height":0,"area":0}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.measurements[0].kind, "Object");
        assert!(!snapshot.room.is_measured());
    }
}
