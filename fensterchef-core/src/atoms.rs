//! Interned atom names and typed decoders (§2's "Atom & property cache").
//!
//! This crate never opens an X11 connection, so it cannot intern atoms
//! itself; `Atoms` is a plain table of already-resolved ids that the binary
//! crate fills in once at startup (the way `pgwm`'s `call_wrapper.rs` builds
//! its `x11rb::atom_manager!`-generated struct by querying the display, then
//! hands the result around). Everything below it is pure: given resolved
//! ids and raw property payloads, decode them into the typed values
//! `window::Properties` wants.

use crate::geometry::Strut;
use crate::window::{NetWmState, Protocol, WindowId, WindowType};

/// Every X atom fensterchef's core logic needs to recognize, named the way
/// `x11rb::atom_manager!` generates field names (so the binary crate can
/// build this struct directly from its macro-generated reply struct).
#[derive(Debug, Clone, Copy, Default)]
#[allow(non_snake_case)]
pub struct Atoms {
    pub WM_STATE: u32,
    pub WM_PROTOCOLS: u32,
    pub WM_DELETE_WINDOW: u32,
    pub WM_TAKE_FOCUS: u32,
    pub WM_CHANGE_STATE: u32,
    pub _NET_WM_STATE: u32,
    pub _NET_WM_STATE_MODAL: u32,
    pub _NET_WM_STATE_STICKY: u32,
    pub _NET_WM_STATE_MAXIMIZED_VERT: u32,
    pub _NET_WM_STATE_MAXIMIZED_HORZ: u32,
    pub _NET_WM_STATE_HIDDEN: u32,
    pub _NET_WM_STATE_FULLSCREEN: u32,
    pub _NET_WM_STATE_ABOVE: u32,
    pub _NET_WM_STATE_DEMANDS_ATTENTION: u32,
    pub _NET_WM_WINDOW_TYPE: u32,
    pub _NET_WM_WINDOW_TYPE_DESKTOP: u32,
    pub _NET_WM_WINDOW_TYPE_DOCK: u32,
    pub _NET_WM_WINDOW_TYPE_TOOLBAR: u32,
    pub _NET_WM_WINDOW_TYPE_MENU: u32,
    pub _NET_WM_WINDOW_TYPE_UTILITY: u32,
    pub _NET_WM_WINDOW_TYPE_SPLASH: u32,
    pub _NET_WM_WINDOW_TYPE_DIALOG: u32,
    pub _NET_WM_WINDOW_TYPE_NORMAL: u32,
    pub _NET_WM_STRUT_PARTIAL: u32,
    pub _NET_WM_STRUT: u32,
    pub _NET_WM_FULLSCREEN_MONITORS: u32,
    pub _NET_CLOSE_WINDOW: u32,
    pub _NET_MOVERESIZE_WINDOW: u32,
    pub _NET_WM_MOVERESIZE: u32,
    pub _NET_REQUEST_FRAME_EXTENTS: u32,
    pub _NET_SUPPORTED: u32,
    pub _NET_SUPPORTING_WM_CHECK: u32,
    pub _NET_ACTIVE_WINDOW: u32,
    pub _NET_CLIENT_LIST: u32,
    pub _NET_CLIENT_LIST_STACKING: u32,
    pub _NET_NUMBER_OF_DESKTOPS: u32,
    pub _NET_CURRENT_DESKTOP: u32,
    pub _NET_DESKTOP_GEOMETRY: u32,
    pub _NET_DESKTOP_VIEWPORT: u32,
    pub _NET_DESKTOP_NAMES: u32,
    pub _NET_WORKAREA: u32,
    pub _MOTIF_WM_HINTS: u32,
}

/// `_MOTIF_WM_HINTS` is 5 `u32`s: flags, functions, decorations, input
/// mode, status. Only the decorations flag/field matter here.
const MOTIF_HINTS_DECORATIONS_FLAG: u32 = 1 << 1;

impl Atoms {
    /// `_NET_WM_WINDOW_TYPE_*` → [`WindowType`], skipping atoms this crate
    /// does not track. Order is preserved, matching §4.2's "a window-type
    /// list" reasoning over the first-recognized entries.
    #[must_use]
    pub fn decode_window_types(&self, raw: &[u32]) -> Vec<WindowType> {
        raw.iter().filter_map(|a| self.window_type_of(*a)).collect()
    }

    #[must_use]
    pub fn window_type_of(&self, atom: u32) -> Option<WindowType> {
        Some(match atom {
            a if a == self._NET_WM_WINDOW_TYPE_DESKTOP => WindowType::Desktop,
            a if a == self._NET_WM_WINDOW_TYPE_DOCK => WindowType::Dock,
            a if a == self._NET_WM_WINDOW_TYPE_TOOLBAR => WindowType::Toolbar,
            a if a == self._NET_WM_WINDOW_TYPE_MENU => WindowType::Menu,
            a if a == self._NET_WM_WINDOW_TYPE_UTILITY => WindowType::Utility,
            a if a == self._NET_WM_WINDOW_TYPE_SPLASH => WindowType::Splash,
            a if a == self._NET_WM_WINDOW_TYPE_DIALOG => WindowType::Dialog,
            a if a == self._NET_WM_WINDOW_TYPE_NORMAL => WindowType::Normal,
            _ => return None,
        })
    }

    /// `_NET_WM_STATE` atom list → [`NetWmState`] flags.
    #[must_use]
    pub fn decode_net_wm_state(&self, raw: &[u32]) -> NetWmState {
        let mut state = NetWmState::default();
        for &a in raw {
            match a {
                x if x == self._NET_WM_STATE_MODAL => state.modal = true,
                x if x == self._NET_WM_STATE_STICKY => state.sticky = true,
                x if x == self._NET_WM_STATE_MAXIMIZED_VERT => state.maximized_vert = true,
                x if x == self._NET_WM_STATE_MAXIMIZED_HORZ => state.maximized_horz = true,
                x if x == self._NET_WM_STATE_HIDDEN => state.hidden = true,
                x if x == self._NET_WM_STATE_FULLSCREEN => state.fullscreen = true,
                // Open question (`DESIGN.md`): `_NET_WM_STATE_BELOW` has no
                // atom of its own here; a `toggle-below` binding targets
                // `above` instead, so `ABOVE` is the only one decoded.
                x if x == self._NET_WM_STATE_ABOVE => state.above = true,
                x if x == self._NET_WM_STATE_DEMANDS_ATTENTION => state.demands_attention = true,
                _ => {}
            }
        }
        state
    }

    /// `WM_PROTOCOLS` atom list → [`Protocol`] values this crate acts on.
    #[must_use]
    pub fn decode_protocols(&self, raw: &[u32]) -> Vec<Protocol> {
        raw.iter()
            .filter_map(|a| match *a {
                x if x == self.WM_DELETE_WINDOW => Some(Protocol::Delete),
                x if x == self.WM_TAKE_FOCUS => Some(Protocol::TakeFocus),
                _ => None,
            })
            .collect()
    }

    /// `_NET_WM_STRUT_PARTIAL` (12 `u32`s: left, right, top, bottom, plus 8
    /// start/end pairs we don't track) or the older 4-word `_NET_WM_STRUT`.
    #[must_use]
    pub fn decode_strut(&self, raw: &[u32]) -> Option<Strut> {
        if raw.len() < 4 {
            return None;
        }
        let strut = Strut {
            left: raw[0],
            right: raw[1],
            top: raw[2],
            bottom: raw[3],
        };
        if strut == Strut::default() {
            None
        } else {
            Some(strut)
        }
    }

    /// `_MOTIF_WM_HINTS` → whether the client asks for no decorations.
    #[must_use]
    pub fn decode_motif_hides_decorations(&self, raw: &[u32]) -> bool {
        matches!(raw, [flags, _functions, decorations, ..]
            if flags & MOTIF_HINTS_DECORATIONS_FLAG != 0 && *decorations == 0)
    }

    /// `_NET_WM_FULLSCREEN_MONITORS` (4 `u32`s: top, bottom, left, right
    /// monitor indices) — returned as-is, resolved against the live
    /// `MonitorSet` by the caller.
    #[must_use]
    pub fn decode_fullscreen_monitors(&self, raw: &[u32]) -> Option<(u32, u32, u32, u32)> {
        match raw {
            [top, bottom, left, right] => Some((*top, *bottom, *left, *right)),
            _ => None,
        }
    }

    #[must_use]
    pub fn decode_transient_for(&self, raw: &[u32]) -> Option<WindowId> {
        raw.first().filter(|id| **id != 0).map(|id| WindowId(*id))
    }
}

/// The fixed list of atom names to intern, in declaration order, so the
/// binary crate's `x11rb::atom_manager!` invocation and this struct's
/// fields line up mechanically.
pub const ATOM_NAMES: &[&str] = &[
    "WM_STATE",
    "WM_PROTOCOLS",
    "WM_DELETE_WINDOW",
    "WM_TAKE_FOCUS",
    "WM_CHANGE_STATE",
    "_NET_WM_STATE",
    "_NET_WM_STATE_MODAL",
    "_NET_WM_STATE_STICKY",
    "_NET_WM_STATE_MAXIMIZED_VERT",
    "_NET_WM_STATE_MAXIMIZED_HORZ",
    "_NET_WM_STATE_HIDDEN",
    "_NET_WM_STATE_FULLSCREEN",
    "_NET_WM_STATE_ABOVE",
    "_NET_WM_STATE_DEMANDS_ATTENTION",
    "_NET_WM_WINDOW_TYPE",
    "_NET_WM_WINDOW_TYPE_DESKTOP",
    "_NET_WM_WINDOW_TYPE_DOCK",
    "_NET_WM_WINDOW_TYPE_TOOLBAR",
    "_NET_WM_WINDOW_TYPE_MENU",
    "_NET_WM_WINDOW_TYPE_UTILITY",
    "_NET_WM_WINDOW_TYPE_SPLASH",
    "_NET_WM_WINDOW_TYPE_DIALOG",
    "_NET_WM_WINDOW_TYPE_NORMAL",
    "_NET_WM_STRUT_PARTIAL",
    "_NET_WM_STRUT",
    "_NET_WM_FULLSCREEN_MONITORS",
    "_NET_CLOSE_WINDOW",
    "_NET_MOVERESIZE_WINDOW",
    "_NET_WM_MOVERESIZE",
    "_NET_REQUEST_FRAME_EXTENTS",
    "_NET_SUPPORTED",
    "_NET_SUPPORTING_WM_CHECK",
    "_NET_ACTIVE_WINDOW",
    "_NET_CLIENT_LIST",
    "_NET_CLIENT_LIST_STACKING",
    "_NET_NUMBER_OF_DESKTOPS",
    "_NET_CURRENT_DESKTOP",
    "_NET_DESKTOP_GEOMETRY",
    "_NET_DESKTOP_VIEWPORT",
    "_NET_DESKTOP_NAMES",
    "_NET_WORKAREA",
    "_MOTIF_WM_HINTS",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms() -> Atoms {
        Atoms {
            _NET_WM_WINDOW_TYPE_DOCK: 5,
            _NET_WM_STATE_FULLSCREEN: 9,
            WM_DELETE_WINDOW: 20,
            ..Atoms::default()
        }
    }

    #[test]
    fn decodes_known_window_type() {
        let atoms = atoms();
        assert_eq!(atoms.decode_window_types(&[1, 5, 2]), vec![WindowType::Dock]);
    }

    #[test]
    fn decodes_fullscreen_state() {
        let atoms = atoms();
        let state = atoms.decode_net_wm_state(&[9]);
        assert!(state.fullscreen);
        assert!(!state.modal);
    }

    #[test]
    fn decodes_strut_and_treats_all_zero_as_none() {
        let atoms = atoms();
        assert_eq!(atoms.decode_strut(&[0, 0, 20, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap().top, 20);
        assert_eq!(atoms.decode_strut(&[0, 0, 0, 0]), None);
    }
}
