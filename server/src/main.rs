use std::net::SocketAddr;
use std::path::PathBuf;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use measure_shared::{
    CALIBRATE_PATH, MEASUREMENTS_PATH, MEASURE_PATH, RESET_PATH, SCAN_START_PATH, SCAN_STOP_PATH,
};
use tower_http::services::ServeDir;

mod detector;
mod handlers;
mod logic;
mod state;

use crate::detector::{DetectArg, FixedDetector};
use crate::handlers::{
    calibrate_handler, measure_handler, measurements_handler, reset_handler, scan_start_handler,
    scan_stop_handler,
};
use crate::state::AppState;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    public_dir: Option<PathBuf>,
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
    /// Rectangle the detector reports for every frame, as x,y,w,h pixels.
    #[arg(long)]
    detect: Option<DetectArg>,
}

fn router(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route(CALIBRATE_PATH, post(calibrate_handler))
        .route(MEASURE_PATH, post(measure_handler))
        .route(SCAN_START_PATH, post(scan_start_handler))
        .route(SCAN_STOP_PATH, post(scan_stop_handler))
        .route(RESET_PATH, post(reset_handler))
        .route(MEASUREMENTS_PATH, get(measurements_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let detector = args.detect.map(FixedDetector::from).unwrap_or_default();
    log::info!("Detector reports {:?}", detector.rect);
    let state = AppState::new(detector);

    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let app = router(state, public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    log::info!("Measurement backend running at http://localhost:{}", args.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app).await.expect("Server crashed");
}
