mod app;
mod color;
mod data;
mod feedback;
mod state;
mod ui;

use std::path::Path;

use app::SalesScopeApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Scope – E-commerce Analytics",
        options,
        Box::new(|_cc| {
            let mut app = SalesScopeApp::default();

            // Optional dataset path on the command line; a bad file is shown
            // in the status line rather than aborting the session.
            if let Some(arg) = std::env::args().nth(1) {
                match data::loader::load_file(Path::new(&arg)) {
                    Ok(dataset) => {
                        log::info!("Loaded {} orders from {arg}", dataset.len());
                        app.state.set_dataset(dataset);
                    }
                    Err(e) => {
                        log::error!("Failed to load {arg}: {e}");
                        app.state.status_message = Some(format!("Error: {e}"));
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
}
