//! Particle cloud + mesh demo.
//!
//! Opens a 640x480 window, renders 1000 jittering particles and a rotating,
//! pulsing mesh until Escape is pressed or the window is closed.

mod app;
mod config;
mod state;

use nebula_engine::logging::{init_logging, LoggingConfig};
use nebula_engine::window::Runtime;

use crate::app::DemoApp;
use crate::config::DemoConfig;

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = run() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = DemoConfig::default();
    let app = DemoApp::new(&config)?;
    Runtime::run(config.runtime.clone(), config.gpu.clone(), app)
}
