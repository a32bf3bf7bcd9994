mod backend_bridge;
mod controller;
mod ui;

use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{WaterQualityApp, APP_TITLE};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = client_core::load_settings();
    tracing::info!(
        endpoint = %settings.endpoint,
        timeout = ?settings.request_timeout,
        "starting water quality client"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    // The worker exits on its own once the app drops the command sender.
    let _worker = backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([480.0, 860.0])
            .with_min_inner_size([360.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| {
            let mut app = WaterQualityApp::new(cmd_tx, ui_rx);
            app.request_probe();
            Ok(Box::new(app))
        }),
    )
}
