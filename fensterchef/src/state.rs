//! The window manager's in-memory state (§3 in full): everything
//! [`crate::host::Host`] mutates and [`crate::wm`]'s event loop feeds from
//! X11 and synchronizes back to it. Grounded on the teacher's `WmState`
//! (`manager::mod::WmState`, now deleted — see `DESIGN.md`), restructured
//! around `fensterchef-core`'s arena/registry types rather than the
//! teacher's fixed-capacity `heapless` maps.

use fensterchef_core::config::Configuration;
use fensterchef_core::frame::stash::Stash;
use fensterchef_core::frame::{FrameId, FrameTree};
use fensterchef_core::monitor::MonitorSet;
use fensterchef_core::sync::{Notification, SyncState};
use fensterchef_core::variables::Variables;
use fensterchef_core::window::{WindowId, WindowRegistry};

/// A control-flow request raised by an action the evaluator ran this
/// cycle, observed by `wm.rs` after the binding's bytecode finishes
/// running (§4.4: `quit`/`reload` end the event loop rather than just
/// mutating state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingControl {
    Reload,
    Quit,
}

pub(crate) struct State {
    pub(crate) config: Configuration,
    pub(crate) tree: FrameTree,
    pub(crate) stash: Stash,
    pub(crate) monitors: MonitorSet,
    pub(crate) registry: WindowRegistry,
    pub(crate) variables: Variables,
    pub(crate) sync_state: SyncState,
    pub(crate) notification: Option<Notification>,
    /// The frame the next frame-relative binding (split/move/focus/resize)
    /// acts on — `original_source`'s single global "focused frame" cursor,
    /// independent of which window (if any) currently has input focus.
    pub(crate) selected_frame: FrameId,
    pub(crate) pending_control: Option<PendingControl>,
    /// Windows `Action::CloseWindow` asked to close this cycle, handled by
    /// `wm.rs` after the evaluator returns via the two-strike
    /// delete/grace-period/kill policy (§4.2/§5) — `Host` has no X11
    /// connection to act on these immediately.
    pub(crate) pending_close: Vec<WindowId>,
    /// Windows `Action::KillWindow` asked to force-kill this cycle, same
    /// reasoning as `pending_close` but without the delete/grace-period
    /// policy.
    pub(crate) pending_kill: Vec<WindowId>,
}

impl State {
    pub(crate) fn new(config: Configuration, monitors: MonitorSet, tree: FrameTree, selected_frame: FrameId) -> Self {
        let mut registry = WindowRegistry::new();
        registry.set_number_floor(config.assignment.first_window_number.max(1) as u32);
        Self {
            config,
            tree,
            stash: Stash::new(),
            monitors,
            registry,
            variables: Variables::new(),
            sync_state: SyncState::new(),
            notification: None,
            selected_frame,
            pending_control: None,
            pending_close: Vec::new(),
            pending_kill: Vec::new(),
        }
    }
}
