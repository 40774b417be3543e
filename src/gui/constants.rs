//! GUI-specific constants for layout and colors

use egui;

/// Picker window dimensions
pub const PICKER_WIDTH: f32 = 360.0;
pub const PICKER_HEIGHT: f32 = 420.0;

/// Picker window dimensions while the editor is open
pub const EDITOR_WIDTH: f32 = 560.0;
pub const EDITOR_HEIGHT: f32 = 520.0;

/// Layout spacing
pub const PADDING: f32 = 10.0;
pub const SECTION_SPACING: f32 = 10.0;
pub const ITEM_SPACING: f32 = 6.0;

/// Height of the scrollable checkbox list
pub const LIST_MAX_HEIGHT: f32 = 300.0;

/// Height of the string list inside the editor
pub const EDITOR_LIST_HEIGHT: f32 = 260.0;

/// Multi-line string dialog size
pub const STRING_DIALOG_WIDTH: f32 = 460.0;
pub const STRING_DIALOG_ROWS: usize = 8;

/// Status colors
pub const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);
pub const HINT_COLOR: egui::Color32 = egui::Color32::from_rgb(140, 140, 140);
