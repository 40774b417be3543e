//! Editor for sections and strings, operating on the session's working copy
//!
//! The component renders from a snapshot of the working copy, collects at
//! most one command per frame, then applies it through the edit session.
//! Every sub-dialog is pushed onto the session's modal stack while open.

use eframe::egui;
use tracing::{error, warn};

use crate::config::Document;
use crate::error::Result;
use crate::gui::components::settings_editor;
use crate::gui::constants::*;
use crate::session::{EditSession, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Commit,
    Discard,
}

enum Dialog {
    NewSection(String),
    RenameSection(String),
    ConfirmRemoveSection,
    /// `position` is `None` when adding a new string
    EditString { position: Option<usize>, text: String },
}

enum Command {
    SelectSection(usize),
    MoveSection(usize),
    OpenDialog(Dialog),
    CloseDialog,
    AddSection(String),
    RenameSection(String),
    RemoveSection,
    SaveString { position: Option<usize>, text: String },
    RemoveString(usize),
    MoveUp(usize),
    MoveDown(usize),
    MoveString { position: usize, to: usize },
    SetDisplayLength(i64),
    Commit,
    Discard,
}

pub struct SectionEditor {
    section: usize,
    selected: Option<usize>,
    move_target: usize,
    dialog: Option<Dialog>,
    error: Option<String>,
}

impl SectionEditor {
    pub fn new() -> Self {
        Self {
            section: 0,
            selected: None,
            move_target: 0,
            dialog: None,
            error: None,
        }
    }

    /// Start editing at the section the picker is showing
    pub fn start_at(&mut self, section: usize) {
        *self = Self::new();
        self.section = section;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Close any sub-dialog and discard the edit session
    pub fn abandon(&mut self, session: &mut Session) {
        self.close_dialog(session);
        if session.editor().is_some() {
            if let Err(e) = session.discard_editor() {
                error!(error = %e, "Failed to discard edit session");
            }
        }
        *self = Self::new();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, session: &mut Session) -> EditorAction {
        let Some(edit) = session.editor() else {
            return EditorAction::None;
        };
        let doc = edit.working_copy().clone();

        if self.section >= doc.section_count() {
            self.section = doc.section_count() - 1;
            self.selected = None;
        }
        let strings = &doc.sections()[self.section].strings;
        if self.selected.is_some_and(|p| p >= strings.len()) {
            self.selected = None;
        }

        let mut command = None;

        ui.add_enabled_ui(self.dialog.is_none(), |ui| {
            self.sections_group(ui, &doc, &mut command);
            ui.add_space(SECTION_SPACING);
            self.strings_group(ui, &doc, &mut command);
            ui.add_space(SECTION_SPACING);

            if let Some(length) = settings_editor::ui(ui, doc.settings().display_length()) {
                command = Some(Command::SetDisplayLength(length));
            }

            if let Some(message) = &self.error {
                ui.add_space(ITEM_SPACING);
                ui.colored_label(ERROR_COLOR, message.as_str());
            }

            ui.add_space(SECTION_SPACING);
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    command = Some(Command::Commit);
                }
                if ui.button("Cancel").clicked() {
                    command = Some(Command::Discard);
                }
            });
        });

        self.show_dialog(ui.ctx(), &doc, &mut command);

        match command {
            Some(command) => self.apply(session, command),
            None => EditorAction::None,
        }
    }

    fn sections_group(&mut self, ui: &mut egui::Ui, doc: &Document, command: &mut Option<Command>) {
        let current = &doc.sections()[self.section];

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Section:").strong());

                let mut chosen = self.section;
                egui::ComboBox::from_id_salt("section_selector")
                    .selected_text(current.name.as_str())
                    .show_ui(ui, |ui| {
                        for (idx, section) in doc.sections().iter().enumerate() {
                            let label = format!("{} ({})", section.name, section.strings.len());
                            ui.selectable_value(&mut chosen, idx, label);
                        }
                    });
                if chosen != self.section {
                    *command = Some(Command::SelectSection(chosen));
                }
            });

            ui.add_space(ITEM_SPACING);

            ui.horizontal(|ui| {
                if ui.button("➕ New").clicked() {
                    *command = Some(Command::OpenDialog(Dialog::NewSection(String::new())));
                }
                if ui.button("✏ Rename").clicked() {
                    *command = Some(Command::OpenDialog(Dialog::RenameSection(current.name.clone())));
                }
                if ui.add_enabled(self.section > 0, egui::Button::new("⬆")).clicked() {
                    *command = Some(Command::MoveSection(self.section - 1));
                }
                if ui
                    .add_enabled(self.section + 1 < doc.section_count(), egui::Button::new("⬇"))
                    .clicked()
                {
                    *command = Some(Command::MoveSection(self.section + 1));
                }
                if doc.section_count() > 1 {
                    if ui.button("🗑 Delete").clicked() {
                        *command = Some(Command::OpenDialog(Dialog::ConfirmRemoveSection));
                    }
                } else {
                    ui.label("(Cannot delete last section)");
                }
            });
        });
    }

    fn strings_group(&mut self, ui: &mut egui::Ui, doc: &Document, command: &mut Option<Command>) {
        let strings = &doc.sections()[self.section].strings;

        ui.group(|ui| {
            ui.label(egui::RichText::new("Strings (double-click to edit)").strong());
            ui.add_space(ITEM_SPACING);

            egui::ScrollArea::vertical()
                .id_salt("editor_strings")
                .max_height(EDITOR_LIST_HEIGHT)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for (pos, text) in strings.iter().enumerate() {
                        let response = ui
                            .selectable_label(self.selected == Some(pos), doc.display(text).into_owned())
                            .on_hover_text(text.as_str());
                        if response.clicked() {
                            self.selected = Some(pos);
                        }
                        if response.double_clicked() {
                            *command = Some(Command::OpenDialog(Dialog::EditString {
                                position: Some(pos),
                                text: text.clone(),
                            }));
                        }
                    }

                    if strings.is_empty() {
                        ui.label(egui::RichText::new("(No strings in this section)").italics().weak());
                    }
                });

            ui.add_space(ITEM_SPACING);

            let selected = self.selected;
            ui.horizontal(|ui| {
                if ui.button("Add").clicked() {
                    *command = Some(Command::OpenDialog(Dialog::EditString {
                        position: None,
                        text: String::new(),
                    }));
                }
                if ui.add_enabled(selected.is_some(), egui::Button::new("Edit")).clicked() {
                    if let Some(pos) = selected {
                        *command = Some(Command::OpenDialog(Dialog::EditString {
                            position: Some(pos),
                            text: strings[pos].clone(),
                        }));
                    }
                }
                if ui.add_enabled(selected.is_some(), egui::Button::new("Remove")).clicked() {
                    if let Some(pos) = selected {
                        *command = Some(Command::RemoveString(pos));
                    }
                }
                if ui.add_enabled(selected.is_some_and(|p| p > 0), egui::Button::new("Up")).clicked() {
                    if let Some(pos) = selected {
                        *command = Some(Command::MoveUp(pos));
                    }
                }
                if ui
                    .add_enabled(selected.is_some_and(|p| p + 1 < strings.len()), egui::Button::new("Down"))
                    .clicked()
                {
                    if let Some(pos) = selected {
                        *command = Some(Command::MoveDown(pos));
                    }
                }
            });

            if doc.section_count() > 1 {
                if self.move_target == self.section || self.move_target >= doc.section_count() {
                    self.move_target = if self.section == 0 { 1 } else { 0 };
                }

                ui.horizontal(|ui| {
                    ui.label("Move to:");
                    egui::ComboBox::from_id_salt("move_target")
                        .selected_text(doc.sections()[self.move_target].name.as_str())
                        .show_ui(ui, |ui| {
                            for (idx, section) in doc.sections().iter().enumerate() {
                                if idx != self.section {
                                    ui.selectable_value(&mut self.move_target, idx, section.name.as_str());
                                }
                            }
                        });
                    if ui.add_enabled(selected.is_some(), egui::Button::new("Move")).clicked() {
                        if let Some(position) = selected {
                            *command = Some(Command::MoveString {
                                position,
                                to: self.move_target,
                            });
                        }
                    }
                });
            }
        });
    }

    fn show_dialog(&mut self, ctx: &egui::Context, doc: &Document, command: &mut Option<Command>) {
        let error = self.error.clone();
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };

        match dialog {
            Dialog::NewSection(name) => {
                name_dialog(ctx, "New Section", "Create", name, error.as_deref(), command, Command::AddSection);
            }
            Dialog::RenameSection(name) => {
                name_dialog(ctx, "Rename Section", "Save", name, error.as_deref(), command, Command::RenameSection);
            }
            Dialog::ConfirmRemoveSection => {
                let section = &doc.sections()[self.section];
                egui::Window::new("Confirm Delete")
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.label(format!(
                            "Delete section '{}' and its {} string(s)?",
                            section.name,
                            section.strings.len()
                        ));
                        ui.colored_label(ERROR_COLOR, "Takes effect when the editor is confirmed with OK.");

                        ui.add_space(ITEM_SPACING);

                        ui.horizontal(|ui| {
                            if ui.button("Delete").clicked() {
                                *command = Some(Command::RemoveSection);
                            }
                            if ui.button("Cancel").clicked() {
                                *command = Some(Command::CloseDialog);
                            }
                        });
                    });
            }
            Dialog::EditString { position, text } => {
                let title = if position.is_some() { "Edit String" } else { "Add String" };
                egui::Window::new(title)
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut *text)
                                .desired_rows(STRING_DIALOG_ROWS)
                                .desired_width(STRING_DIALOG_WIDTH),
                        );

                        if let Some(message) = error.as_deref() {
                            ui.colored_label(ERROR_COLOR, message);
                        }

                        ui.add_space(ITEM_SPACING);

                        ui.horizontal(|ui| {
                            if ui.button("OK").clicked() {
                                *command = Some(Command::SaveString {
                                    position: *position,
                                    text: text.clone(),
                                });
                            }
                            if ui.button("Cancel").clicked() {
                                *command = Some(Command::CloseDialog);
                            }
                        });
                    });
            }
        }
    }

    fn apply(&mut self, session: &mut Session, command: Command) -> EditorAction {
        let closes_dialog = match command {
            Command::OpenDialog(dialog) => {
                self.open_dialog(session, dialog);
                return EditorAction::None;
            }
            Command::CloseDialog => {
                self.close_dialog(session);
                return EditorAction::None;
            }
            Command::Commit => return EditorAction::Commit,
            Command::Discard => return EditorAction::Discard,
            Command::AddSection(_)
            | Command::RenameSection(_)
            | Command::RemoveSection
            | Command::SaveString { .. } => true,
            _ => false,
        };

        let result = match session.editor_mut() {
            Some(edit) => self.apply_edit(edit, command),
            None => return EditorAction::None,
        };

        match result {
            Ok(()) => {
                self.error = None;
                if closes_dialog {
                    self.close_dialog(session);
                }
            }
            Err(e) => {
                warn!(error = %e, "Edit rejected");
                self.error = Some(e.to_string());
            }
        }
        EditorAction::None
    }

    fn apply_edit(&mut self, edit: &mut EditSession, command: Command) -> Result<()> {
        match command {
            Command::SelectSection(idx) => {
                self.section = idx;
                self.selected = None;
            }
            Command::MoveSection(to) => {
                if edit.reorder_sections(self.section, to)? {
                    self.section = to;
                }
            }
            Command::AddSection(name) => {
                self.section = edit.add_section(&name)?;
                self.selected = None;
            }
            Command::RenameSection(name) => edit.rename_section(self.section, &name)?,
            Command::RemoveSection => {
                edit.remove_section(self.section)?;
                self.section = self.section.min(edit.working_copy().section_count() - 1);
                self.selected = None;
            }
            Command::SaveString { position: None, text } => {
                if edit.add_string(self.section, &text)? {
                    let len = edit.working_copy().sections()[self.section].strings.len();
                    self.selected = Some(len - 1);
                }
            }
            Command::SaveString { position: Some(pos), text } => {
                edit.set_string(self.section, pos, &text)?;
            }
            Command::RemoveString(pos) => {
                edit.remove_string(self.section, pos)?;
                self.selected = None;
            }
            Command::MoveUp(pos) => {
                if edit.move_up(pos, self.section)? {
                    self.selected = Some(pos - 1);
                }
            }
            Command::MoveDown(pos) => {
                if edit.move_down(pos, self.section)? {
                    self.selected = Some(pos + 1);
                }
            }
            Command::MoveString { position, to } => {
                if edit.move_string(position, self.section, to)? {
                    self.selected = None;
                }
            }
            Command::SetDisplayLength(length) => {
                edit.set_display_length(length)?;
            }
            Command::OpenDialog(_) | Command::CloseDialog | Command::Commit | Command::Discard => {}
        }
        Ok(())
    }

    fn open_dialog(&mut self, session: &mut Session, dialog: Dialog) {
        if self.dialog.is_none() {
            session.push_modal();
        }
        self.error = None;
        self.dialog = Some(dialog);
    }

    fn close_dialog(&mut self, session: &mut Session) {
        if self.dialog.take().is_some() {
            session.pop_modal();
        }
    }
}

/// Single-line name prompt shared by the new/rename dialogs
fn name_dialog(
    ctx: &egui::Context,
    title: &str,
    confirm: &str,
    name: &mut String,
    error: Option<&str>,
    command: &mut Option<Command>,
    on_confirm: fn(String) -> Command,
) {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Section Name:");
            let response = ui.text_edit_singleline(name);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if let Some(message) = error {
                ui.colored_label(ERROR_COLOR, message);
            }

            ui.add_space(ITEM_SPACING);

            ui.horizontal(|ui| {
                if ui.button(confirm).clicked() || submitted {
                    *command = Some(on_confirm(name.clone()));
                }
                if ui.button("Cancel").clicked() {
                    *command = Some(Command::CloseDialog);
                }
            });
        });
}
