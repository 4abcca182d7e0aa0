//! Atom interning via `x11rb::atom_manager!`, replacing the teacher's
//! hand-rolled `impl_atoms!`/`FnvIndexMap` pair (see `DESIGN.md`) now that
//! `x11rb` ships the macro directly. The field list is generated from
//! `fensterchef_core::atoms::ATOM_NAMES` so the two stay impossible to
//! drift apart by hand.

use x11rb::atom_manager;
use x11rb::rust_connection::RustConnection;

use crate::error::Result;

atom_manager! {
    pub(crate) Atoms: AtomsCookie {
        WM_STATE,
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        WM_TAKE_FOCUS,
        WM_CHANGE_STATE,
        _NET_WM_STATE,
        _NET_WM_STATE_MODAL,
        _NET_WM_STATE_STICKY,
        _NET_WM_STATE_MAXIMIZED_VERT,
        _NET_WM_STATE_MAXIMIZED_HORZ,
        _NET_WM_STATE_HIDDEN,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_STATE_ABOVE,
        _NET_WM_STATE_DEMANDS_ATTENTION,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DESKTOP,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_WINDOW_TYPE_TOOLBAR,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_WM_WINDOW_TYPE_NORMAL,
        _NET_WM_STRUT_PARTIAL,
        _NET_WM_STRUT,
        _NET_WM_FULLSCREEN_MONITORS,
        _NET_CLOSE_WINDOW,
        _NET_MOVERESIZE_WINDOW,
        _NET_WM_MOVERESIZE,
        _NET_REQUEST_FRAME_EXTENTS,
        _NET_SUPPORTED,
        _NET_SUPPORTING_WM_CHECK,
        _NET_ACTIVE_WINDOW,
        _NET_CLIENT_LIST,
        _NET_CLIENT_LIST_STACKING,
        _NET_NUMBER_OF_DESKTOPS,
        _NET_CURRENT_DESKTOP,
        _NET_DESKTOP_GEOMETRY,
        _NET_DESKTOP_VIEWPORT,
        _NET_DESKTOP_NAMES,
        _NET_WORKAREA,
        _MOTIF_WM_HINTS,
    }
}

impl Atoms {
    pub(crate) fn intern(connection: &RustConnection) -> Result<Self> {
        Ok(Self::new(connection)?.reply()?)
    }

    /// Converts into the core crate's plain, connection-free atom table.
    #[allow(non_snake_case)]
    pub(crate) fn to_core(&self) -> fensterchef_core::atoms::Atoms {
        fensterchef_core::atoms::Atoms {
            WM_STATE: self.WM_STATE,
            WM_PROTOCOLS: self.WM_PROTOCOLS,
            WM_DELETE_WINDOW: self.WM_DELETE_WINDOW,
            WM_TAKE_FOCUS: self.WM_TAKE_FOCUS,
            WM_CHANGE_STATE: self.WM_CHANGE_STATE,
            _NET_WM_STATE: self._NET_WM_STATE,
            _NET_WM_STATE_MODAL: self._NET_WM_STATE_MODAL,
            _NET_WM_STATE_STICKY: self._NET_WM_STATE_STICKY,
            _NET_WM_STATE_MAXIMIZED_VERT: self._NET_WM_STATE_MAXIMIZED_VERT,
            _NET_WM_STATE_MAXIMIZED_HORZ: self._NET_WM_STATE_MAXIMIZED_HORZ,
            _NET_WM_STATE_HIDDEN: self._NET_WM_STATE_HIDDEN,
            _NET_WM_STATE_FULLSCREEN: self._NET_WM_STATE_FULLSCREEN,
            _NET_WM_STATE_ABOVE: self._NET_WM_STATE_ABOVE,
            _NET_WM_STATE_DEMANDS_ATTENTION: self._NET_WM_STATE_DEMANDS_ATTENTION,
            _NET_WM_WINDOW_TYPE: self._NET_WM_WINDOW_TYPE,
            _NET_WM_WINDOW_TYPE_DESKTOP: self._NET_WM_WINDOW_TYPE_DESKTOP,
            _NET_WM_WINDOW_TYPE_DOCK: self._NET_WM_WINDOW_TYPE_DOCK,
            _NET_WM_WINDOW_TYPE_TOOLBAR: self._NET_WM_WINDOW_TYPE_TOOLBAR,
            _NET_WM_WINDOW_TYPE_MENU: self._NET_WM_WINDOW_TYPE_MENU,
            _NET_WM_WINDOW_TYPE_UTILITY: self._NET_WM_WINDOW_TYPE_UTILITY,
            _NET_WM_WINDOW_TYPE_SPLASH: self._NET_WM_WINDOW_TYPE_SPLASH,
            _NET_WM_WINDOW_TYPE_DIALOG: self._NET_WM_WINDOW_TYPE_DIALOG,
            _NET_WM_WINDOW_TYPE_NORMAL: self._NET_WM_WINDOW_TYPE_NORMAL,
            _NET_WM_STRUT_PARTIAL: self._NET_WM_STRUT_PARTIAL,
            _NET_WM_STRUT: self._NET_WM_STRUT,
            _NET_WM_FULLSCREEN_MONITORS: self._NET_WM_FULLSCREEN_MONITORS,
            _NET_CLOSE_WINDOW: self._NET_CLOSE_WINDOW,
            _NET_MOVERESIZE_WINDOW: self._NET_MOVERESIZE_WINDOW,
            _NET_WM_MOVERESIZE: self._NET_WM_MOVERESIZE,
            _NET_REQUEST_FRAME_EXTENTS: self._NET_REQUEST_FRAME_EXTENTS,
            _NET_SUPPORTED: self._NET_SUPPORTED,
            _NET_SUPPORTING_WM_CHECK: self._NET_SUPPORTING_WM_CHECK,
            _NET_ACTIVE_WINDOW: self._NET_ACTIVE_WINDOW,
            _NET_CLIENT_LIST: self._NET_CLIENT_LIST,
            _NET_CLIENT_LIST_STACKING: self._NET_CLIENT_LIST_STACKING,
            _NET_NUMBER_OF_DESKTOPS: self._NET_NUMBER_OF_DESKTOPS,
            _NET_CURRENT_DESKTOP: self._NET_CURRENT_DESKTOP,
            _NET_DESKTOP_GEOMETRY: self._NET_DESKTOP_GEOMETRY,
            _NET_DESKTOP_VIEWPORT: self._NET_DESKTOP_VIEWPORT,
            _NET_DESKTOP_NAMES: self._NET_DESKTOP_NAMES,
            _NET_WORKAREA: self._NET_WORKAREA,
            _MOTIF_WM_HINTS: self._MOTIF_WM_HINTS,
        }
    }
}
