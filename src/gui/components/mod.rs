pub mod section_editor;
pub mod settings_editor;
