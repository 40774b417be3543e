use anyhow::{Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::constants::x11;

/// Open X11 connection with the atoms the handoff needs
pub struct X11Session {
    pub conn: RustConnection,
    pub screen_num: usize,
    pub atoms: CachedAtoms,
}

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub net_active_window: Atom,
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            net_active_window: conn.intern_atom(false, b"_NET_ACTIVE_WINDOW")
                .context("Failed to intern _NET_ACTIVE_WINDOW atom")?
                .reply()
                .context("Failed to get reply for _NET_ACTIVE_WINDOW atom")?
                .atom,
        })
    }
}

impl X11Session {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11 display")?;
        let atoms = CachedAtoms::new(&conn)?;
        debug!(screen = screen_num, "connected to x11");
        Ok(Self {
            conn,
            screen_num,
            atoms,
        })
    }

    pub fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }

    /// Window named by the root's _NET_ACTIVE_WINDOW, if any
    pub fn active_window(&self) -> Result<Option<Window>> {
        let prop = self
            .conn
            .get_property(
                false,
                self.screen().root,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .context("Failed to query _NET_ACTIVE_WINDOW property")?
            .reply()
            .context("Failed to get reply for _NET_ACTIVE_WINDOW query")?;

        Ok(prop
            .value32()
            .and_then(|mut values| values.next())
            .filter(|&window| window != x11rb::NONE))
    }

    /// Activate (focus) an X11 window using _NET_ACTIVE_WINDOW
    pub fn activate_window(&self, window: Window) -> Result<()> {
        // First, raise the window to top of stack; checked so a vanished
        // window fails here instead of silently
        self.conn
            .configure_window(
                window,
                &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
            )
            .context(format!("Failed to raise window {} to top of stack", window))?
            .check()
            .context(format!("X server rejected raising window {}", window))?;

        // Send _NET_ACTIVE_WINDOW client message to root window
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_: self.atoms.net_active_window,
            data: ClientMessageData::from([
                x11::ACTIVE_WINDOW_SOURCE_PAGER, // Source indication: 2 = pager/direct user action
                x11rb::CURRENT_TIME,
                0, // Requestor's currently active window (0 = none)
                0,
                0,
            ]),
        };

        self.conn
            .send_event(
                false,
                self.screen().root,
                EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
                &event,
            )
            .context(format!("Failed to send _NET_ACTIVE_WINDOW event for window {}", window))?;

        self.conn.flush()
            .context("Failed to flush X11 connection after window activation")?;
        Ok(())
    }

    /// Pointer position in root coordinates
    pub fn pointer_position(&self) -> Result<(i32, i32)> {
        let reply = self
            .conn
            .query_pointer(self.screen().root)
            .context("Failed to query pointer")?
            .reply()
            .context("Failed to get reply for pointer query")?;
        Ok((i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    pub fn screen_size(&self) -> (u32, u32) {
        let screen = self.screen();
        (
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        )
    }
}
