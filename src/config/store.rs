//! Loading, migrating and saving the persisted document
//!
//! Load never fails: a missing or unreadable file yields the default
//! document. Save writes the whole document and reports failures loudly.

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::{Document, Section, Settings};
use crate::constants::{config, display};
use crate::error::{Error, Result};

/// Load/save collaborator for the document
pub trait DocumentStore {
    fn load(&self) -> Document;
    fn save(&self, document: &Document) -> Result<()>;
}

/// JSON document at a fixed per-user location
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/prompt_click/strings.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Document {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No document found, using defaults");
                return Document::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read document, using defaults");
                return Document::default();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => {
                let document = migrate(value);
                info!(
                    path = %self.path.display(),
                    sections = document.section_count(),
                    "Loaded document"
                );
                document
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to parse document, using defaults");
                Document::default()
            }
        }
    }

    fn save(&self, document: &Document) -> Result<()> {
        let persistence = |source| Error::Persistence {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persistence)?;
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| persistence(std::io::Error::other(e)))?;

        fs::write(&self.path, json).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to write document");
            persistence(e)
        })?;

        info!(path = %self.path.display(), "Saved document");
        Ok(())
    }
}

// ==============================================================================
// Schema migration
// ==============================================================================

/// Current-schema shape as found on disk, before normalization
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    settings: Option<Value>,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    strings: Vec<String>,
}

/// Turn any accepted on-disk shape into a current document.
/// First match wins: bare list, object with `strings` but no `sections`,
/// then the current schema.
fn migrate(value: Value) -> Document {
    match value {
        Value::Array(items) => match strings_from(items) {
            Some(strings) => {
                info!(count = strings.len(), "Migrating legacy string list");
                legacy_document(strings, Settings::default())
            }
            None => {
                warn!("Legacy string list contains non-string items, using defaults");
                Document::default()
            }
        },
        Value::Object(mut map) if map.contains_key("strings") && !map.contains_key("sections") => {
            let settings = normalize_settings(map.get("settings"));
            let strings = match map.remove("strings") {
                Some(Value::Array(items)) => strings_from(items),
                _ => None,
            };
            match strings {
                Some(strings) => {
                    info!(count = strings.len(), "Migrating legacy strings object");
                    legacy_document(strings, settings)
                }
                None => {
                    warn!("Legacy 'strings' is not a list of strings, using defaults");
                    Document::default()
                }
            }
        }
        other => match serde_json::from_value::<RawDocument>(other) {
            Ok(raw) => normalize(raw),
            Err(e) => {
                warn!(error = %e, "Document does not match the current schema, using defaults");
                Document::default()
            }
        },
    }
}

fn strings_from(items: Vec<Value>) -> Option<Vec<String>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn legacy_document(strings: Vec<String>, settings: Settings) -> Document {
    Document::new(settings, vec![Section::new(config::DEFAULT_SECTION, strings)])
}

fn normalize(raw: RawDocument) -> Document {
    let settings = normalize_settings(raw.settings.as_ref());
    let sections = raw
        .sections
        .into_iter()
        .enumerate()
        .map(|(idx, section)| {
            let name = section.name.trim();
            let name = if !name.is_empty() {
                name.to_string()
            } else if idx == 0 {
                config::DEFAULT_SECTION.to_string()
            } else {
                format!("Section {}", idx + 1)
            };
            Section::new(name, section.strings)
        })
        .collect();
    Document::new(settings, sections)
}

/// Read `truncate_length`, falling back to the default when absent or invalid
fn normalize_settings(settings: Option<&Value>) -> Settings {
    let length = settings.and_then(|s| s.get("truncate_length"));
    match length.and_then(Value::as_u64) {
        Some(n) if n >= display::MIN_LENGTH as u64 => {
            let n = usize::try_from(n).unwrap_or(display::MAX_LENGTH);
            if n > display::MAX_LENGTH {
                warn!(truncate_length = n, max = display::MAX_LENGTH, "truncate_length exceeds maximum, clamping");
            }
            Settings::with_display_length(n)
        }
        Some(_) | None => {
            if let Some(value) = length {
                warn!(truncate_length = %value, using = display::DEFAULT_LENGTH, "Invalid truncate_length, using default");
            }
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(contents: &str) -> (TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.json");
        fs::write(&path, contents).unwrap();
        (dir, JsonFileStore::new(path))
    }

    fn only_general(doc: &Document) -> &[String] {
        assert_eq!(doc.section_count(), 1);
        assert_eq!(doc.sections()[0].name, "General");
        &doc.sections()[0].strings
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load(), Document::default());
    }

    #[test]
    fn test_load_corrupt_file_gives_default() {
        let (_dir, store) = store_with("{ not json");
        assert_eq!(store.load(), Document::default());
    }

    #[test]
    fn test_migrate_bare_list() {
        let (_dir, store) = store_with(r#"["b", "a", "b"]"#);
        let doc = store.load();
        assert_eq!(only_general(&doc), ["b", "a", "b"]);
        assert_eq!(doc.settings().display_length(), 30);
    }

    #[test]
    fn test_migrate_strings_object_keeps_settings() {
        let (_dir, store) = store_with(
            r#"{"settings": {"truncate_length": 12}, "strings": ["one", "two"]}"#,
        );
        let doc = store.load();
        assert_eq!(only_general(&doc), ["one", "two"]);
        assert_eq!(doc.settings().display_length(), 12);
    }

    #[test]
    fn test_migrate_strings_object_without_settings() {
        let (_dir, store) = store_with(r#"{"strings": ["only"]}"#);
        let doc = store.load();
        assert_eq!(only_general(&doc), ["only"]);
        assert_eq!(doc.settings().display_length(), 30);
    }

    #[test]
    fn test_sections_key_wins_over_strings() {
        let (_dir, store) = store_with(
            r#"{"strings": ["legacy"], "sections": [{"name": "Work", "strings": ["z"]}]}"#,
        );
        let doc = store.load();
        assert_eq!(doc.sections()[0].name, "Work");
        assert_eq!(doc.sections()[0].strings, ["z"]);
    }

    #[test]
    fn test_bare_list_with_non_strings_gives_default() {
        let (_dir, store) = store_with(r#"["a", 3]"#);
        assert_eq!(store.load(), Document::default());
    }

    #[test]
    fn test_current_schema_missing_settings() {
        let (_dir, store) = store_with(r#"{"sections": [{"name": "A", "strings": ["1"]}]}"#);
        let doc = store.load();
        assert_eq!(doc.settings().display_length(), 30);
        assert_eq!(doc.sections()[0].strings, ["1"]);
    }

    #[test]
    fn test_invalid_truncate_length_defaults() {
        for bad in ["0", "-5", "\"long\"", "2.5", "null"] {
            let (_dir, store) = store_with(&format!(
                r#"{{"settings": {{"truncate_length": {bad}}}, "sections": [{{"name": "A", "strings": []}}]}}"#
            ));
            assert_eq!(store.load().settings().display_length(), 30, "value {bad}");
        }
    }

    #[test]
    fn test_empty_sections_get_general() {
        let (_dir, store) = store_with(r#"{"settings": {"truncate_length": 8}, "sections": []}"#);
        let doc = store.load();
        assert_eq!(only_general(&doc).len(), 0);
        assert_eq!(doc.settings().display_length(), 8);
    }

    #[test]
    fn test_blank_section_names_replaced() {
        let (_dir, store) = store_with(
            r#"{"sections": [{"name": " ", "strings": []}, {"name": "", "strings": ["q"]}]}"#,
        );
        let doc = store.load();
        assert_eq!(doc.sections()[0].name, "General");
        assert_eq!(doc.sections()[1].name, "Section 2");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("deeper").join("strings.json"));

        let mut doc = Document::default();
        doc.add_section("Work").unwrap();
        doc.add_string(1, "naïve — ünïcode");
        doc.add_string(1, "multi\nline");
        doc.set_display_length(7).unwrap();

        store.save(&doc).unwrap();
        assert_eq!(store.load(), doc);

        // Saving what we loaded produces the same bytes
        let first = fs::read_to_string(store.path()).unwrap();
        store.save(&store.load()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), first);
    }

    #[test]
    fn test_save_writes_current_schema() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("strings.json"));
        store.save(&Document::default()).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["settings"]["truncate_length"], 30);
        assert_eq!(value["sections"][0]["name"], "General");
        assert_eq!(value["sections"][0]["strings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_save_fails_loudly_when_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let store = JsonFileStore::new(blocker.join("sub").join("strings.json"));

        let result = store.save(&Document::default());
        assert!(matches!(result, Err(Error::Persistence { .. })));
    }
}
