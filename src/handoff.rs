//! Handoff: deliver the composed text to the previously focused window
//!
//! Order is fixed and there is no rollback: write the clipboard(s), dismiss
//! the picker, then (best effort) re-activate the captured window and send a
//! paste keystroke. Only the clipboard write matters for the minimum
//! contract; every later failure is logged and swallowed.

use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::constants::handoff;
use crate::error::Result;

/// Opaque handle of a top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTarget {
    Clipboard,
    Primary,
}

impl ClipboardTarget {
    pub fn selection_name(&self) -> &'static str {
        match self {
            ClipboardTarget::Clipboard => "clipboard",
            ClipboardTarget::Primary => "primary",
        }
    }
}

/// Focus and clipboard primitives of the windowing environment. Each call is
/// fallible, side-effecting and independent of the others.
pub trait Desktop {
    fn active_window(&self) -> Result<WindowHandle>;
    fn activate_window(&self, window: WindowHandle) -> Result<()>;
    fn send_paste(&self) -> Result<()>;
    fn write_clipboard(&self, text: &str, target: ClipboardTarget) -> Result<()>;

    /// Whether a primary selection exists alongside the clipboard
    fn has_primary_selection(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pauses {
    pub before_activate: Duration,
    pub before_paste: Duration,
}

impl Default for Pauses {
    fn default() -> Self {
        Self {
            before_activate: Duration::from_millis(handoff::PRE_ACTIVATE_PAUSE_MS),
            before_paste: Duration::from_millis(handoff::PRE_PASTE_PAUSE_MS),
        }
    }
}

/// What actually happened during a delivery
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub clipboard: bool,
    pub primary: bool,
    pub focus_restored: bool,
    pub pasted: bool,
}

pub struct Handoff<D: Desktop> {
    desktop: D,
    previous: Option<WindowHandle>,
    pauses: Pauses,
    paste: bool,
}

impl<D: Desktop> Handoff<D> {
    /// Remember the currently focused window. Call before any UI is shown.
    pub fn capture(desktop: D) -> Self {
        let previous = match desktop.active_window() {
            Ok(window) => {
                info!(window = window.0, "Captured previously active window");
                Some(window)
            }
            Err(e) => {
                warn!(error = %e, "Could not determine active window, paste handoff disabled");
                None
            }
        };
        Self {
            desktop,
            previous,
            pauses: Pauses::default(),
            paste: true,
        }
    }

    #[cfg(test)]
    pub fn with_pauses(mut self, pauses: Pauses) -> Self {
        self.pauses = pauses;
        self
    }

    /// Stop after the clipboard write: no focus restore, no keystroke
    pub fn clipboard_only(mut self) -> Self {
        self.paste = false;
        self
    }

    pub fn previous_window(&self) -> Option<WindowHandle> {
        self.previous
    }

    /// Step 1: write the text to the clipboard and, best effort, to the
    /// primary selection. The returned value runs the rest once the picker
    /// surface is gone.
    pub fn begin(self, text: &str) -> PendingRestore<D> {
        let mut report = DeliveryReport::default();

        match self.desktop.write_clipboard(text, ClipboardTarget::Clipboard) {
            Ok(()) => report.clipboard = true,
            Err(e) => error!(error = %e, "Failed to write clipboard"),
        }

        if self.desktop.has_primary_selection() {
            match self.desktop.write_clipboard(text, ClipboardTarget::Primary) {
                Ok(()) => report.primary = true,
                Err(e) => warn!(error = %e, "Failed to write primary selection"),
            }
        }

        info!(chars = text.chars().count(), clipboard = report.clipboard, primary = report.primary, "Clipboard written");

        PendingRestore {
            desktop: self.desktop,
            previous: if self.paste { self.previous } else { None },
            pauses: self.pauses,
            report,
        }
    }
}

/// Steps 2 and 3 of a handoff whose clipboard write already happened
#[must_use = "the focus restore only happens when `complete` is called"]
pub struct PendingRestore<D: Desktop> {
    desktop: D,
    previous: Option<WindowHandle>,
    pauses: Pauses,
    report: DeliveryReport,
}

impl<D: Desktop> PendingRestore<D> {
    pub fn report(&self) -> DeliveryReport {
        self.report
    }

    /// Step 3: re-activate the captured window and paste. Call after the
    /// picker surface has been dismissed. Failures are logged, never raised.
    pub fn complete(self) -> DeliveryReport {
        let mut report = self.report;
        let Some(window) = self.previous else {
            info!("No previous window, leaving text on the clipboard");
            return report;
        };

        thread::sleep(self.pauses.before_activate);
        if let Err(e) = self.desktop.activate_window(window) {
            warn!(window = window.0, error = %e, "Failed to re-activate previous window");
            return report;
        }
        report.focus_restored = true;

        if !report.clipboard {
            warn!("Clipboard write failed earlier, pasting anyway");
        }

        thread::sleep(self.pauses.before_paste);
        match self.desktop.send_paste() {
            Ok(()) => {
                report.pasted = true;
                info!(window = window.0, "Pasted into previous window");
            }
            Err(e) => warn!(error = %e, "Failed to send paste keystroke"),
        }
        report
    }
}
