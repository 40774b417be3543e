//! egui/eframe picker window and its editing components

mod components;
mod constants;
mod picker;

pub use picker::{run_picker, PickerOutcome};
