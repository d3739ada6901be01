pub mod app;
pub mod dialogue_box;
pub mod settings;
pub mod settings_io;
