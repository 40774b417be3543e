//! Settings editor component for the edit session's working copy

use eframe::egui;

use crate::constants::display;
use crate::gui::constants::{HINT_COLOR, ITEM_SPACING};

/// Renders the display-length control and returns the new length if it changed
pub fn ui(ui: &mut egui::Ui, current: usize) -> Option<i64> {
    let mut length = current as i64;
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Display Settings").strong());
        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Truncate after:");
            ui.add_space(5.0);
            if ui
                .add(
                    egui::Slider::new(
                        &mut length,
                        display::MIN_LENGTH as i64..=display::MAX_LENGTH as i64,
                    )
                    .logarithmic(true)
                    .suffix(" chars"),
                )
                .changed()
            {
                changed = true;
            }
        });

        ui.label(
            egui::RichText::new("(Longer strings are shortened in lists, never when pasted)")
                .small()
                .italics()
                .color(HINT_COLOR),
        );
    });

    changed.then_some(length)
}
