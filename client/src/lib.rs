pub mod actions;
mod app;
pub mod config;
mod dom;
pub mod error;
pub mod geometry;
mod logging;
pub mod measurements;
pub mod net;
pub mod ports;
pub mod reference;
pub mod render;
pub mod state;

#[cfg(test)]
mod testing;

pub use actions::{Dispatcher, ScanOutcome};
pub use app::run;
