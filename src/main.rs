use clap::Parser;
use eframe::egui;

use xsheet::app::XSheetApp;
use xsheet::cli::Args;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([820.0, 480.0])
            .with_title("X-Sheet"),
        ..Default::default()
    };

    eframe::run_native(
        "xsheet",
        options,
        Box::new(move |cc| {
            let mut app: XSheetApp = cc
                .storage
                .and_then(|s| s.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();
            app.bootstrap(&args);
            Ok(Box::new(app))
        }),
    )
}
