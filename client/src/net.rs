use async_trait::async_trait;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, Window};

use measure_shared::{
    CalibrateRequest, CalibrateResponse, MeasureResponse, MeasurementsSnapshot, ResetResponse,
    ScanResponse, CALIBRATE_PATH, MEASUREMENTS_PATH, MEASURE_PATH, RESET_PATH, SCAN_START_PATH,
    SCAN_STOP_PATH,
};

use crate::error::TransportError;

/// The measurement backend as a request/response oracle.
#[async_trait(?Send)]
pub trait Api {
    async fn calibrate(
        &self,
        request: &CalibrateRequest,
    ) -> Result<CalibrateResponse, TransportError>;
    async fn measure(&self) -> Result<MeasureResponse, TransportError>;
    async fn start_scan(&self) -> Result<ScanResponse, TransportError>;
    async fn stop_scan(&self) -> Result<ScanResponse, TransportError>;
    async fn reset(&self) -> Result<ResetResponse, TransportError>;
    async fn measurements(&self) -> Result<MeasurementsSnapshot, TransportError>;
}

pub struct FetchApi {
    window: Window,
    base: String,
}

impl FetchApi {
    pub fn new(window: Window, base: impl Into<String>) -> Self {
        Self {
            window,
            base: base.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<T, TransportError> {
        let url = self.url(path);
        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = &body {
            init.set_body(&JsValue::from_str(body));
        }
        let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        log::debug!("{method} {url}");
        let value = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: Response = value
            .dyn_into()
            .map_err(|_| TransportError::Malformed("fetch did not yield a Response".into()))?;
        if !response.ok() {
            return Err(TransportError::Status(response.status()));
        }
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .ok_or_else(|| TransportError::Malformed("response body is not text".into()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait(?Send)]
impl Api for FetchApi {
    async fn calibrate(
        &self,
        request: &CalibrateRequest,
    ) -> Result<CalibrateResponse, TransportError> {
        let body = serde_json::to_string(request)?;
        self.send("POST", CALIBRATE_PATH, Some(body)).await
    }

    async fn measure(&self) -> Result<MeasureResponse, TransportError> {
        self.send("POST", MEASURE_PATH, None).await
    }

    async fn start_scan(&self) -> Result<ScanResponse, TransportError> {
        self.send("POST", SCAN_START_PATH, None).await
    }

    async fn stop_scan(&self) -> Result<ScanResponse, TransportError> {
        self.send("POST", SCAN_STOP_PATH, None).await
    }

    async fn reset(&self) -> Result<ResetResponse, TransportError> {
        self.send("POST", RESET_PATH, None).await
    }

    async fn measurements(&self) -> Result<MeasurementsSnapshot, TransportError> {
        self.send("GET", MEASUREMENTS_PATH, None).await
    }
}

fn js_error(value: JsValue) -> TransportError {
    let detail = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    TransportError::Network(detail)
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
