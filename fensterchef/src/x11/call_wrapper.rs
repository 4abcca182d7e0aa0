//! The X11-calling half of managing a window (§4.6 step by step): becoming
//! the window manager, configuring/mapping/unmapping clients, assigning
//! focus, writing `WM_STATE`/border colors/EWMH client lists. Grounded on
//! the teacher's `x11::call_wrapper::CallWrapper`, trimmed of the
//! glyph/picture rendering methods the status bar used (out of scope here)
//! and of the hand-rolled atom table now that [`super::atoms::Atoms`]
//! covers it.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt, CreateWindowAux,
    EventMask, InputFocus, PropMode, Screen, StackMode, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::CURRENT_TIME;

use fensterchef_core::atoms::Atoms as CoreAtoms;
use fensterchef_core::geometry::Rect;
use fensterchef_core::window::WmState;

use crate::error::{Error, Result};
use crate::x11::atoms::Atoms;

/// `SubstructureRedirect`/`SubstructureNotify` on the root window is what
/// makes us *the* window manager; requesting it on an X server that
/// already has one yields `BadAccess`.
fn wm_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::PROPERTY_CHANGE
}

pub(crate) struct CallWrapper<'a> {
    connection: &'a RustConnection,
    pub(crate) atoms: Atoms,
    pub(crate) core_atoms: CoreAtoms,
    root: Window,
}

impl<'a> CallWrapper<'a> {
    pub(crate) fn new(connection: &'a RustConnection, screen: &Screen) -> Result<Self> {
        let atoms = Atoms::intern(connection)?;
        let core_atoms = atoms.to_core();
        Ok(Self {
            connection,
            atoms,
            core_atoms,
            root: screen.root,
        })
    }

    /// Claims the root window's substructure events. `BadAccess` means
    /// another window manager already holds them.
    pub(crate) fn try_become_wm(&self, screen: &Screen) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().event_mask(wm_event_mask());
        let result = self
            .connection
            .change_window_attributes(screen.root, &aux)?
            .check();
        match result {
            Ok(()) => Ok(()),
            Err(x11rb::errors::ReplyError::X11Error(e))
                if e.error_kind == x11rb::protocol::ErrorKind::Access =>
            {
                Err(Error::BecomeWm)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Advertises EWMH support and seeds the client-list properties, the
    /// way `set_default_manager_props` does on the teacher.
    pub(crate) fn set_default_manager_props(&self, check_window: Window) -> Result<()> {
        let supported: Vec<Atom> = vec![
            self.core_atoms._NET_SUPPORTED,
            self.core_atoms._NET_SUPPORTING_WM_CHECK,
            self.core_atoms._NET_ACTIVE_WINDOW,
            self.core_atoms._NET_CLIENT_LIST,
            self.core_atoms._NET_CLIENT_LIST_STACKING,
            self.core_atoms._NET_WM_STATE,
            self.core_atoms._NET_WM_STATE_FULLSCREEN,
            self.core_atoms._NET_WM_STATE_DEMANDS_ATTENTION,
            self.core_atoms._NET_WM_WINDOW_TYPE,
            self.core_atoms._NET_WM_STRUT_PARTIAL,
            self.core_atoms._NET_CLOSE_WINDOW,
            self.core_atoms._NET_REQUEST_FRAME_EXTENTS,
        ];
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.core_atoms._NET_SUPPORTED,
            x11rb::protocol::xproto::AtomEnum::ATOM,
            &supported,
        )?;
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.core_atoms._NET_SUPPORTING_WM_CHECK,
            x11rb::protocol::xproto::AtomEnum::WINDOW,
            &[check_window],
        )?;
        self.connection.change_property32(
            PropMode::REPLACE,
            check_window,
            self.core_atoms._NET_SUPPORTING_WM_CHECK,
            x11rb::protocol::xproto::AtomEnum::WINDOW,
            &[check_window],
        )?;
        self.set_client_list(&[])?;
        self.set_client_list_stacking(&[])?;
        Ok(())
    }

    pub(crate) fn create_check_window(&self) -> Result<Window> {
        let id = self.connection.generate_id()?;
        self.connection.create_window(
            0,
            id,
            self.root,
            -1,
            -1,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            0,
            &CreateWindowAux::new(),
        )?;
        Ok(id)
    }

    pub(crate) fn set_client_list(&self, windows: &[Window]) -> Result<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.core_atoms._NET_CLIENT_LIST,
            x11rb::protocol::xproto::AtomEnum::WINDOW,
            windows,
        )?;
        Ok(())
    }

    pub(crate) fn set_client_list_stacking(&self, windows: &[Window]) -> Result<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.core_atoms._NET_CLIENT_LIST_STACKING,
            x11rb::protocol::xproto::AtomEnum::WINDOW,
            windows,
        )?;
        Ok(())
    }

    pub(crate) fn set_active_window(&self, window: Option<Window>) -> Result<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.core_atoms._NET_ACTIVE_WINDOW,
            x11rb::protocol::xproto::AtomEnum::WINDOW,
            &[window.unwrap_or(0)],
        )?;
        Ok(())
    }

    pub(crate) fn map_window(&self, window: Window) -> Result<()> {
        self.connection.map_window(window)?;
        Ok(())
    }

    pub(crate) fn unmap_window(&self, window: Window) -> Result<()> {
        self.connection.unmap_window(window)?;
        Ok(())
    }

    pub(crate) fn destroy_window(&self, window: Window) -> Result<()> {
        self.connection.destroy_window(window)?;
        Ok(())
    }

    pub(crate) fn configure_window(&self, window: Window, rect: Rect, border_width: u32) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(rect.x)
            .y(rect.y)
            .width(rect.width)
            .height(rect.height)
            .border_width(border_width);
        self.connection.configure_window(window, &aux)?;
        Ok(())
    }

    pub(crate) fn push_window_to_top(&self, window: Window) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.connection.configure_window(window, &aux)?;
        Ok(())
    }

    pub(crate) fn change_border_color(&self, window: Window, pixel: u32) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().border_pixel(pixel);
        self.connection.change_window_attributes(window, &aux)?;
        Ok(())
    }

    pub(crate) fn set_wm_state(&self, window: Window, state: WmState) -> Result<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.core_atoms.WM_STATE,
            self.core_atoms.WM_STATE,
            &[state.value(), 0],
        )?;
        Ok(())
    }

    /// Sets `_NET_WM_STATE_HIDDEN` as the window's entire `_NET_WM_STATE`
    /// when `hidden`, or clears the property otherwise (§4.6 steps 4-5).
    /// This crate doesn't track other simultaneous `_NET_WM_STATE` flags per
    /// window, so replacing the whole property is equivalent to add/remove.
    pub(crate) fn set_net_wm_state_hidden(&self, window: Window, hidden: bool) -> Result<()> {
        let atoms: &[Atom] = if hidden { &[self.core_atoms._NET_WM_STATE_HIDDEN] } else { &[] };
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.core_atoms._NET_WM_STATE,
            x11rb::protocol::xproto::AtomEnum::ATOM,
            atoms,
        )?;
        Ok(())
    }

    /// `WM_TAKE_FOCUS` (§4.6 step 6): a `ClientMessageEvent` on `WM_PROTOCOLS`
    /// rather than `SetInputFocus`, for clients that manage their own focus.
    pub(crate) fn send_take_focus(&self, window: Window, timestamp: u32) -> Result<()> {
        let event = x11rb::protocol::xproto::ClientMessageEvent::new(
            32,
            window,
            self.core_atoms.WM_PROTOCOLS,
            [self.core_atoms.WM_TAKE_FOCUS, timestamp, 0, 0, 0],
        );
        self.connection
            .send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(())
    }

    pub(crate) fn set_input_focus(&self, window: Window) -> Result<()> {
        self.connection
            .set_input_focus(InputFocus::PARENT, window, CURRENT_TIME)?;
        Ok(())
    }

    pub(crate) fn reset_root_focus(&self) -> Result<()> {
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;
        Ok(())
    }

    /// `WM_DELETE_WINDOW` (§4.4 close): a polite `ClientMessageEvent`,
    /// distinct from `kill_client`'s forceful `KillClient` request.
    pub(crate) fn send_delete(&self, window: Window) -> Result<()> {
        let event = x11rb::protocol::xproto::ClientMessageEvent::new(
            32,
            window,
            self.core_atoms.WM_PROTOCOLS,
            [self.core_atoms.WM_DELETE_WINDOW, CURRENT_TIME, 0, 0, 0],
        );
        self.connection
            .send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(())
    }

    pub(crate) fn kill_client(&self, window: Window) -> Result<()> {
        self.connection.kill_client(window)?;
        Ok(())
    }

    pub(crate) fn grab_key(&self, keycode: u8, modifiers: u16) -> Result<()> {
        self.connection.grab_key(
            true,
            self.root,
            modifiers,
            keycode,
            x11rb::protocol::xproto::GrabMode::ASYNC,
            x11rb::protocol::xproto::GrabMode::ASYNC,
        )?;
        Ok(())
    }

    pub(crate) fn ungrab_all_keys(&self) -> Result<()> {
        self.connection.ungrab_key(
            x11rb::protocol::xproto::GRAB_ANY as u8,
            self.root,
            u16::from(x11rb::protocol::xproto::ModMask::ANY),
        )?;
        Ok(())
    }

    pub(crate) fn flush(&self) -> Result<()> {
        self.connection.flush()?;
        Ok(())
    }

    pub(crate) fn root(&self) -> Window {
        self.root
    }

    pub(crate) fn connection(&self) -> &'a RustConnection {
        self.connection
    }

    pub(crate) fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    pub(crate) fn core_atoms(&self) -> &CoreAtoms {
        &self.core_atoms
    }
}
