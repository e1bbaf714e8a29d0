//! Native 3D commit history race visualizer
//!
//! Fetches a GitHub repository's branch histories, lays them out as a 3D
//! commit graph, and replays them newest-first with a chasing camera.

mod api;
mod app;
mod camera;
mod graph;
mod playback;
mod settings;
mod theme;

use eframe::egui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Commit Race"),
        persist_window: true, // Persist window state and egui memory between sessions
        ..Default::default()
    };

    eframe::run_native(
        "Commit Race",
        options,
        Box::new(|cc| Ok(Box::new(app::RaceApp::new(cc)))),
    )
}
