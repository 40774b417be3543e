//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Persisted document location and defaults
pub mod config {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "prompt_click";

    /// Document file name
    pub const FILENAME: &str = "strings.json";

    /// Name of the section created for fresh and migrated documents
    pub const DEFAULT_SECTION: &str = "General";

    /// Strings seeded into a fresh document
    pub const PLACEHOLDER_STRINGS: [&str; 2] = ["Example string 1", "Example string 2"];
}

/// Display projection of long strings
pub mod display {
    /// Characters shown before truncation when the document doesn't say
    pub const DEFAULT_LENGTH: usize = 30;

    pub const MIN_LENGTH: usize = 1;

    pub const MAX_LENGTH: usize = 500;

    /// Appended to truncated text
    pub const ELLIPSIS: &str = "...";
}

/// Composition of the pasted text
pub mod compose {
    /// Joins selected strings
    pub const SEPARATOR: &str = ", ";
}

/// Focus restore and paste handoff
pub mod handoff {
    /// Pause after the picker closes, before activating the previous window
    pub const PRE_ACTIVATE_PAUSE_MS: u64 = 100;

    /// Pause after activation, before the paste keystroke
    pub const PRE_PASTE_PAUSE_MS: u64 = 100;

    /// Default bound on every external call
    pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

    /// Clipboard writer
    pub const XCLIP: &str = "xclip";

    /// Keystroke synthesizer
    pub const XDOTOOL: &str = "xdotool";

    /// Keystroke that pastes the clipboard in most X11 applications
    pub const PASTE_KEYS: &str = "shift+Insert";
}

/// X11 protocol constants
pub mod x11 {
    /// Source indication for _NET_ACTIVE_WINDOW (2 = pager/direct user action)
    pub const ACTIVE_WINDOW_SOURCE_PAGER: u32 = 2;
}
