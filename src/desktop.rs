//! X11 desktop backend for the handoff
//!
//! Window queries go through x11rb; the clipboard is written with `xclip`
//! (it keeps serving the selection after we exit) and the paste keystroke is
//! sent with `xdotool`. Every call is bounded by a timeout so a stuck X server
//! or tool can't hang the picker.

use anyhow::Context;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::constants::handoff;
use crate::error::{Error, Result};
use crate::handoff::{ClipboardTarget, Desktop, WindowHandle};
use crate::x11_utils::X11Session;

pub struct X11Desktop {
    // Option so Drop can shut it down without waiting on stuck blocking calls
    runtime: Option<Runtime>,
    x11: Option<Arc<X11Session>>,
    timeout: Duration,
}

impl X11Desktop {
    /// Connect to the display. A missing display is not an error: window
    /// calls then fail individually and the handoff degrades to clipboard only.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let mut desktop = Self::detached(timeout)?;
        match desktop.bounded_blocking("x11 connect", X11Session::connect) {
            Ok(session) => desktop.x11 = Some(Arc::new(session)),
            Err(e) => warn!(error = %e, "No X11 connection, focus handoff unavailable"),
        }
        Ok(desktop)
    }

    /// Backend without an X11 connection
    pub fn detached(timeout: Duration) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build runtime for external calls")?;
        Ok(Self {
            runtime: Some(runtime),
            x11: None,
            timeout,
        })
    }

    /// Pointer position and screen size, for placing the picker
    pub fn pointer_and_screen(&self) -> Option<((i32, i32), (u32, u32))> {
        self.x11_call("query pointer", |x11| {
            Ok((x11.pointer_position()?, x11.screen_size()))
        })
        .inspect_err(|e| warn!(error = %e, "Could not query pointer position"))
        .ok()
    }

    fn runtime(&self) -> &Runtime {
        // Only None while dropping
        self.runtime.as_ref().unwrap_or_else(|| unreachable!("runtime used after drop"))
    }

    /// Run a blocking X11 round trip against the shared connection
    fn x11_call<T, F>(&self, tool: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&X11Session) -> anyhow::Result<T> + Send + 'static,
    {
        let session = self
            .x11
            .clone()
            .ok_or_else(|| Error::external(tool, "no X11 connection"))?;
        self.bounded_blocking(tool, move || call(&session))
    }

    fn bounded_blocking<T, F>(&self, tool: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        self.runtime().block_on(async {
            let task = tokio::task::spawn_blocking(call);
            match tokio::time::timeout(self.timeout, task).await {
                Ok(Ok(Ok(value))) => Ok(value),
                Ok(Ok(Err(e))) => Err(Error::external(tool, format!("{e:#}"))),
                Ok(Err(join)) => Err(Error::external(tool, join.to_string())),
                Err(_) => Err(Error::external(tool, format!("timed out after {:?}", self.timeout))),
            }
        })
    }

    /// Spawn an external tool, feed it `input` on stdin and wait for a
    /// successful exit within the timeout
    fn run_tool(&self, program: &'static str, args: &[&str], input: Option<&[u8]>) -> Result<()> {
        debug!(program, ?args, "running external tool");
        self.runtime().block_on(async {
            let run = async {
                let mut child = Command::new(program)
                    .args(args)
                    .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .spawn()
                    .map_err(|e| format!("failed to spawn: {e}"))?;

                if let (Some(mut stdin), Some(input)) = (child.stdin.take(), input) {
                    stdin
                        .write_all(input)
                        .await
                        .map_err(|e| format!("failed to write stdin: {e}"))?;
                    // Dropping stdin closes the pipe so the tool can finish
                }

                let status = child.wait().await.map_err(|e| e.to_string())?;
                if status.success() {
                    Ok(())
                } else {
                    Err(format!("exited with {status}"))
                }
            };

            match tokio::time::timeout(self.timeout, run).await {
                Ok(result) => result.map_err(|reason| Error::external(program, reason)),
                Err(_) => Err(Error::external(
                    program,
                    format!("timed out after {:?}", self.timeout),
                )),
            }
        })
    }
}

impl Desktop for X11Desktop {
    fn active_window(&self) -> Result<WindowHandle> {
        self.x11_call("active window", |x11| x11.active_window())?
            .map(WindowHandle)
            .ok_or_else(|| Error::external("active window", "no window has focus"))
    }

    fn activate_window(&self, window: WindowHandle) -> Result<()> {
        self.x11_call("activate window", move |x11| x11.activate_window(window.0))
    }

    fn send_paste(&self) -> Result<()> {
        self.run_tool(handoff::XDOTOOL, &["key", handoff::PASTE_KEYS], None)
    }

    fn write_clipboard(&self, text: &str, target: ClipboardTarget) -> Result<()> {
        self.run_tool(
            handoff::XCLIP,
            &["-selection", target.selection_name()],
            Some(text.as_bytes()),
        )
    }
}

impl Drop for X11Desktop {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
