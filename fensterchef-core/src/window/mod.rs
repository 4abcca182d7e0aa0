//! Window state: the per-client data cached by the registry (§3.3) and the
//! property types it is built from. Grounded on
//! `pgwm_core::state::properties::WindowProperties` for shape, but uses
//! `std` collections (`String`, `Vec`) throughout rather than the teacher's
//! `heapless`/`smallmap` — those exist in the teacher to let `pgwm-core`
//! also compile under the no_std `pgwm-app` target, which this rewrite does
//! not carry (see `DESIGN.md`).

pub mod classify;
pub mod registry;

use std::time::Instant;

use crate::geometry::{Rect, Strut};

pub use registry::WindowRegistry;

/// The X window resource id. Unlike [`crate::frame::FrameId`] this is not an
/// arena index — it *is* the identifier the X server uses, so it is stable
/// and meaningful outside the registry too (property caches, client
/// messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

/// A window's display mode (§3.3, classification in §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tiling,
    Floating,
    Fullscreen,
    Dock,
    Desktop,
}

impl Mode {
    /// The integer a `set`/`toggle` action call's keyword argument
    /// compiles to (`expr::actions::mode_keyword`) and that its handler
    /// decodes back with [`Mode::from_i32`].
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Mode::Tiling => 0,
            Mode::Floating => 1,
            Mode::Fullscreen => 2,
            Mode::Dock => 3,
            Mode::Desktop => 4,
        }
    }

    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Mode::Tiling,
            1 => Mode::Floating,
            2 => Mode::Fullscreen,
            3 => Mode::Dock,
            4 => Mode::Desktop,
            _ => return None,
        })
    }
}

/// `WM_STATE` as defined by ICCCM: `Withdrawn` (0), `Normal` (1), `Iconic`
/// (3) — 2 is reserved/unused. Mirrors
/// `pgwm_core::state::properties::WmState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

impl WmState {
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }

    #[must_use]
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(WmState::Withdrawn),
            1 => Some(WmState::Normal),
            3 => Some(WmState::Iconic),
            _ => None,
        }
    }
}

/// The subset of `_NET_WM_STATE` atoms fensterchef reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetWmState {
    pub modal: bool,
    pub sticky: bool,
    pub maximized_vert: bool,
    pub maximized_horz: bool,
    pub hidden: bool,
    pub fullscreen: bool,
    pub above: bool,
    pub demands_attention: bool,
}

/// `_NET_WM_WINDOW_TYPE` values relevant to classification (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    Normal,
}

/// ICCCM `WM_PROTOCOLS` values fensterchef acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    TakeFocus,
    Delete,
    Ping,
}

/// `WM_NORMAL_HINTS` fields actually consulted (§4.2 rule 5, `set_size`).
/// Mirrors the subset of `x11rb::properties::WmSizeHints` fensterchef uses;
/// kept as our own small struct (rather than depending on the protocol
/// type directly here) so `fensterchef-core` stays decodable from plain
/// values the binary crate hands in, without needing to parse ICCCM
/// property wire formats itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeHints {
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

/// `WM_HINTS` fields fensterchef consults: whether the client wants
/// keyboard input (absent means "assume yes", ICCCM §4.1.7) and its
/// requested initial state.
#[derive(Debug, Clone, Copy, Default)]
pub struct WmHints {
    pub input: Option<bool>,
    pub initial_state: Option<WmState>,
}

/// Cached, decoded client properties (§3.3). Re-fetched and replaced
/// wholesale on `PropertyNotify` by the binary crate; this crate never
/// talks to the display itself.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    pub name: String,
    pub class: Vec<String>,
    pub size_hints: SizeHints,
    pub hints: WmHints,
    pub strut: Option<Strut>,
    pub transient_for: Option<WindowId>,
    pub protocols: Vec<Protocol>,
    pub fullscreen_monitors: Option<(u32, u32, u32, u32)>,
    pub net_wm_state: NetWmState,
    pub window_types: Vec<WindowType>,
    pub motif_hides_decorations: bool,
}

/// A registered client window (§3.3).
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    pub number: u32,
    pub created_at: Instant,
    pub rect: Rect,
    pub border_size: u32,
    pub mode: Mode,
    pub previous_mode: Option<Mode>,
    pub is_visible: bool,
    pub is_borderless: bool,
    pub wm_state: WmState,
    pub close_requested_at: Option<Instant>,
    pub properties: Properties,
}

impl Window {
    /// Whether this window may currently receive input focus (`focus`,
    /// §4.2): never a dock, and only a window that either wants input or
    /// declares `WM_TAKE_FOCUS`.
    #[must_use]
    pub fn accepts_focus(&self) -> bool {
        if self.mode == Mode::Dock {
            return false;
        }
        self.properties.hints.input != Some(false)
            || self.properties.protocols.contains(&Protocol::TakeFocus)
    }

    #[must_use]
    pub fn supports_delete(&self) -> bool {
        self.properties.protocols.contains(&Protocol::Delete)
    }
}
