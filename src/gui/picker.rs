//! Picker window implemented with egui/eframe
//!
//! One borderless, always-on-top window opened at the pointer. It shows one
//! section at a time, hosts the editor in place, and reports how it closed
//! through a channel so the caller can finish the handoff once the window is
//! really gone.

use std::sync::mpsc;

use anyhow::{anyhow, Result};
use eframe::{egui, NativeOptions};
use tracing::{error, info, warn};

use super::components::section_editor::{EditorAction, SectionEditor};
use super::constants::*;
use crate::handoff::{Desktop, Handoff, PendingRestore};
use crate::placement::{self, Rect};
use crate::session::Session;

/// Pointer position and screen size, both in root-window pixels
pub type Placement = ((i32, i32), (u32, u32));

/// How the picker window closed
pub enum PickerOutcome<D: Desktop> {
    /// Clipboard written; focus restore still pending
    Deliver {
        text: String,
        pending: PendingRestore<D>,
    },
    /// Cancelled, dismissed, or confirmed with nothing selected
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerAction {
    Confirm,
    Cancel,
    Edit,
    Navigate(isize),
}

struct PickerApp<D: Desktop> {
    session: Session,
    handoff: Option<Handoff<D>>,
    outcome: mpsc::Sender<PickerOutcome<D>>,
    editor: SectionEditor,
    /// Screen bounds and the picker's clamped top-left, when the pointer was known
    screen: Option<(Rect, (i32, i32))>,
    had_focus: bool,
    closing: bool,
}

impl<D: Desktop> PickerApp<D> {
    fn new(
        session: Session,
        handoff: Handoff<D>,
        outcome: mpsc::Sender<PickerOutcome<D>>,
        screen: Option<(Rect, (i32, i32))>,
    ) -> Self {
        info!(sections = session.model().section_count(), "Initializing picker");
        Self {
            session,
            handoff: Some(handoff),
            outcome,
            editor: SectionEditor::new(),
            screen,
            had_focus: false,
            closing: false,
        }
    }

    fn confirm(&mut self, ctx: &egui::Context) {
        let outcome = match (self.session.confirm(), self.handoff.take()) {
            (Some(text), Some(handoff)) => {
                let pending = handoff.begin(&text);
                PickerOutcome::Deliver { text, pending }
            }
            (Some(_), None) => {
                warn!("Handoff already consumed, nothing delivered");
                PickerOutcome::Cancelled
            }
            (None, _) => PickerOutcome::Cancelled,
        };
        self.finish(ctx, outcome);
    }

    fn cancel(&mut self, ctx: &egui::Context) {
        self.session.cancel();
        self.finish(ctx, PickerOutcome::Cancelled);
    }

    fn finish(&mut self, ctx: &egui::Context, outcome: PickerOutcome<D>) {
        if self.outcome.send(outcome).is_err() {
            warn!("Picker outcome receiver dropped");
        }
        self.closing = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn open_editor(&mut self, ctx: &egui::Context) {
        match self.session.open_editor() {
            Ok(()) => {
                self.editor.start_at(self.session.current_section());
                self.resize(ctx, EDITOR_WIDTH, EDITOR_HEIGHT);
            }
            Err(e) => error!(error = %e, "Failed to open editor"),
        }
    }

    fn commit_editor(&mut self, ctx: &egui::Context) {
        match self.session.commit_editor() {
            Ok(()) => {
                self.editor = SectionEditor::new();
                self.resize(ctx, PICKER_WIDTH, PICKER_HEIGHT);
            }
            Err(e) => {
                error!(error = %e, "Failed to commit edits");
                self.editor
                    .set_error(format!("{e}. Nothing was changed; fix the problem or cancel."));
            }
        }
    }

    fn discard_editor(&mut self, ctx: &egui::Context) {
        self.editor.abandon(&mut self.session);
        self.resize(ctx, PICKER_WIDTH, PICKER_HEIGHT);
    }

    /// Resize the window, moving it so the new size still fits on screen
    fn resize(&self, ctx: &egui::Context, width: f32, height: f32) {
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(width, height)));
        if let Some((screen, origin)) = self.screen {
            let (x, y) = placement::clamp_to_screen(origin, (width as u32, height as u32), screen);
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
                x as f32, y as f32,
            )));
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) -> Option<PickerAction> {
        let (escape, enter, left, right) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
            )
        });

        if self.session.editor().is_some() {
            if escape {
                info!("Escape pressed, discarding edits");
                self.discard_editor(ctx);
            }
            return None;
        }

        if escape {
            Some(PickerAction::Cancel)
        } else if enter {
            Some(PickerAction::Confirm)
        } else if left {
            Some(PickerAction::Navigate(-1))
        } else if right {
            Some(PickerAction::Navigate(1))
        } else {
            None
        }
    }

    /// Close on focus loss unless a child surface is open
    fn handle_focus(&mut self, ctx: &egui::Context) -> Option<PickerAction> {
        match ctx.input(|i| i.viewport().focused) {
            Some(true) => {
                self.had_focus = true;
                None
            }
            Some(false) if self.had_focus && self.session.closes_on_focus_loss() => {
                info!("Picker lost focus, closing");
                Some(PickerAction::Cancel)
            }
            _ => None,
        }
    }

    fn picker_ui(&mut self, ui: &mut egui::Ui) -> Option<PickerAction> {
        let mut action = None;
        let model = self.session.model();
        let count = model.section_count();
        let current = self.session.current_section();
        let name = model.sections()[current].name.clone();
        let rows: Vec<(String, String)> = model.sections()[current]
            .strings
            .iter()
            .map(|text| (model.display(text).into_owned(), text.clone()))
            .collect();

        ui.label(egui::RichText::new("Select strings to paste:").strong());
        ui.add_space(ITEM_SPACING);

        let header = ui.horizontal(|ui| {
            if ui.add_enabled(count > 1, egui::Button::new("◀")).clicked() {
                action = Some(PickerAction::Navigate(-1));
            }
            ui.label(egui::RichText::new(format!("{name}  ({}/{count})", current + 1)).heading());
            if ui.add_enabled(count > 1, egui::Button::new("▶")).clicked() {
                action = Some(PickerAction::Navigate(1));
            }
        });
        // The wheel belongs to the list below, so only the header row navigates
        if header.response.contains_pointer() {
            if let Some(step) = scroll_step(ui.input(|i| i.raw_scroll_delta.y)) {
                action = Some(PickerAction::Navigate(step));
            }
        }

        ui.add_space(ITEM_SPACING);

        egui::ScrollArea::vertical()
            .id_salt("picker_strings")
            .max_height(LIST_MAX_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (pos, (label, full)) in rows.iter().enumerate() {
                    let mut checked = self.session.is_selected(pos);
                    let mut response = ui.checkbox(&mut checked, label.as_str());
                    if label != full {
                        response = response.on_hover_text(full.as_str());
                    }
                    if response.changed() {
                        self.session.toggle(pos);
                    }
                }

                if rows.is_empty() {
                    ui.label(egui::RichText::new("(No strings in this section)").italics().weak());
                }
            });

        ui.add_space(SECTION_SPACING);
        ui.separator();

        let total = self.session.total_selected_count();
        ui.label(egui::RichText::new(format!("{total} selected")).small().color(HINT_COLOR));

        ui.horizontal(|ui| {
            if ui.button("OK").clicked() {
                action = Some(PickerAction::Confirm);
            }
            if ui.button("Cancel").clicked() {
                action = Some(PickerAction::Cancel);
            }
            if ui.button("Edit...").clicked() {
                action = Some(PickerAction::Edit);
            }
        });

        action
    }
}

impl<D: Desktop> eframe::App for PickerApp<D> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.closing {
            return;
        }

        let mut action = self.handle_keys(ctx).or_else(|| self.handle_focus(ctx));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(PADDING);
            if self.session.editor().is_some() {
                match self.editor.ui(ui, &mut self.session) {
                    EditorAction::Commit => self.commit_editor(ctx),
                    EditorAction::Discard => self.discard_editor(ctx),
                    EditorAction::None => {}
                }
            } else if let Some(clicked) = self.picker_ui(ui) {
                action = Some(clicked);
            }
        });

        match action {
            Some(PickerAction::Confirm) => self.confirm(ctx),
            Some(PickerAction::Cancel) => self.cancel(ctx),
            Some(PickerAction::Edit) => self.open_editor(ctx),
            Some(PickerAction::Navigate(delta)) => {
                self.session.navigate(delta);
            }
            None => {}
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.closing {
            info!("Picker window closed externally");
        }
    }
}

/// Section step for a vertical wheel delta: up goes back, down goes forward
fn scroll_step(delta_y: f32) -> Option<isize> {
    if delta_y > 0.0 {
        Some(-1)
    } else if delta_y < 0.0 {
        Some(1)
    } else {
        None
    }
}

/// Run the picker until it closes and report how it ended
pub fn run_picker<D: Desktop + 'static>(
    session: Session,
    handoff: Handoff<D>,
    placement: Option<Placement>,
) -> Result<PickerOutcome<D>> {
    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([PICKER_WIDTH, PICKER_HEIGHT])
        .with_title("Prompt Click")
        .with_decorations(false)
        .with_resizable(false)
        .with_taskbar(false)
        .with_active(true)
        .with_window_level(egui::WindowLevel::AlwaysOnTop);

    let screen = placement.map(|(pointer, (width, height))| {
        let screen = Rect {
            x: 0,
            y: 0,
            width,
            height,
        };
        let origin = placement::clamp_to_screen(
            pointer,
            (PICKER_WIDTH as u32, PICKER_HEIGHT as u32),
            screen,
        );
        (screen, origin)
    });
    if let Some((_, (x, y))) = screen {
        viewport = viewport.with_position([x as f32, y as f32]);
    }

    let options = NativeOptions {
        viewport,
        centered: placement.is_none(),
        ..Default::default()
    };

    let (tx, rx) = mpsc::channel();
    eframe::run_native(
        "Prompt Click",
        options,
        Box::new(move |_cc| Ok(Box::new(PickerApp::new(session, handoff, tx, screen)))),
    )
    .map_err(|err| anyhow!("Failed to launch picker window: {err}"))?;

    Ok(rx.try_recv().unwrap_or(PickerOutcome::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_step_direction() {
        assert_eq!(scroll_step(24.0), Some(-1));
        assert_eq!(scroll_step(-0.5), Some(1));
        assert_eq!(scroll_step(0.0), None);
    }

    #[test]
    fn test_editor_size_fits_from_corner_origin() {
        let screen = Rect {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        };
        let origin = placement::clamp_to_screen(
            (1800, 1000),
            (PICKER_WIDTH as u32, PICKER_HEIGHT as u32),
            screen,
        );
        let (x, y) = placement::clamp_to_screen(
            origin,
            (EDITOR_WIDTH as u32, EDITOR_HEIGHT as u32),
            screen,
        );
        assert!(x + EDITOR_WIDTH as i32 <= screen.right());
        assert!(y + EDITOR_HEIGHT as i32 <= screen.bottom());
        assert_eq!(
            placement::clamp_to_screen(origin, (PICKER_WIDTH as u32, PICKER_HEIGHT as u32), screen),
            origin
        );
    }
}
