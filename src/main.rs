mod engine;
mod model;
mod ui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = ui::settings_io::load_settings();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NPC Dialogue",
        options,
        Box::new(|_cc| Ok(Box::new(ui::app::DialogueApp::new(settings)))),
    )
}
