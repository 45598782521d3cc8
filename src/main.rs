//! Primer QC - desktop front end for screening primer lists

use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;

use app::PrimerQcApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("Primer QC"),
        ..Default::default()
    };

    eframe::run_native(
        "Primer QC",
        native_options,
        Box::new(|cc| Ok(Box::new(PrimerQcApp::new(cc)))),
    )
}
