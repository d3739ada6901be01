pub mod actor;
pub mod envelope;
pub mod error;
pub mod history;
pub mod scene;
