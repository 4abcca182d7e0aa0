//! The pure half of the per-cycle synchronizer (§4.6): computing border
//! colors, stacking order and the client-list-changed diff from the
//! current frame tree / window registry / monitor set. Grounded on
//! `pgwm`'s `manager::mod`'s `highlight_border`/`restore_normal_border`/
//! `set_border_urgent` for the three-way border color split, and on
//! `window::registry::WindowRegistry::restack_by_mode`/
//! `restack_transient_above` for the Z-order discipline the stacking
//! computation here derives from scratch every cycle.
//!
//! What actually talks to the display (`ConfigureWindow`, `MapWindow`,
//! `ChangeProperty`, `SetInputFocus`) lives in the binary crate; this
//! module only decides *what* those calls should be, as plain values the
//! binary crate can diff against its own cached X state and act on.

use std::time::{Duration, Instant};

use crate::config::BorderSettings;
use crate::frame::FrameTree;
use crate::monitor::MonitorSet;
use crate::window::{Mode, WindowId, WindowRegistry};

/// A window's derived border color (§4.6 step 2): the focused window gets
/// `focus_color`, a window that shares the focused frame's subtree (i.e.
/// sits in the same tiling branch, so a split sibling of the focused leaf)
/// gets `active_color`, the top floating window when nothing is focused
/// also counts as active, and everything else gets the plain `color`.
#[must_use]
pub fn border_color(
    window: WindowId,
    focused: Option<WindowId>,
    shares_focused_subtree: bool,
    is_top_floating: bool,
    colors: &BorderSettings,
) -> u32 {
    if focused == Some(window) {
        colors.focus_color
    } else if shares_focused_subtree || is_top_floating {
        colors.active_color
    } else {
        colors.color
    }
}

/// Whether `frame` is an ancestor of (or equal to) `subject`, walking
/// parent links — the "shares the focused frame subtree" test
/// [`border_color`] needs, computed once per frame pair rather than
/// cached, since the frame tree changes far more often than a redraw
/// needs to track.
#[must_use]
pub fn is_ancestor_or_self(tree: &FrameTree, ancestor: crate::frame::FrameId, mut subject: crate::frame::FrameId) -> bool {
    loop {
        if subject == ancestor {
            return true;
        }
        match tree.parent(subject) {
            Some(parent) => subject = parent,
            None => return false,
        }
    }
}

/// The bottom-to-top stacking order for one monitor's Z-ordered window
/// list (§4.6 step 3): desktop windows first, then tiling, then floating,
/// then docks, then fullscreen, then transient-for overlays placed
/// immediately above the window they're transient for. `z_order` is the
/// registry's existing bottom-to-top list, used only to break ties within
/// a layer (so unrelated windows of the same mode keep their relative
/// order rather than being resorted arbitrarily).
#[must_use]
pub fn compute_stacking(registry: &WindowRegistry, z_order: &[WindowId]) -> Vec<WindowId> {
    let layer = |mode: Mode| -> Vec<WindowId> {
        z_order
            .iter()
            .copied()
            .filter(|id| registry.get(*id).is_some_and(|w| w.mode == mode))
            .collect()
    };

    let mut stacked = Vec::with_capacity(z_order.len());
    stacked.extend(layer(Mode::Desktop));
    stacked.extend(layer(Mode::Tiling));
    stacked.extend(layer(Mode::Floating));
    stacked.extend(layer(Mode::Dock));
    stacked.extend(layer(Mode::Fullscreen));

    // Transient-for overlays: lift each transient window to immediately
    // above its parent, preserving the parent's position among the
    // windows already placed above it.
    let transients: Vec<(WindowId, WindowId)> = z_order
        .iter()
        .copied()
        .filter_map(|id| {
            let parent = registry.get(id)?.properties.transient_for?;
            Some((id, parent))
        })
        .collect();
    for (child, parent) in transients {
        stacked.retain(|id| *id != child);
        if let Some(pos) = stacked.iter().position(|id| *id == parent) {
            stacked.insert(pos + 1, child);
        } else {
            stacked.push(child);
        }
    }
    stacked
}

/// §4.6 steps 4/5: partitions the registry's windows into the ones that
/// should be pushed to the display as visible and the ones that should be
/// withdrawn, in registry (age) order.
#[must_use]
pub fn partition_visibility(registry: &WindowRegistry) -> (Vec<WindowId>, Vec<WindowId>) {
    let mut visible = Vec::new();
    let mut invisible = Vec::new();
    for id in registry.by_age() {
        match registry.get(*id) {
            Some(window) if window.is_visible => visible.push(*id),
            Some(_) => invisible.push(*id),
            None => {}
        }
    }
    (visible, invisible)
}

/// How input focus should be handed to a newly focused window (§4.6 step
/// 6): via the `WM_TAKE_FOCUS` client-message protocol when the window
/// declares it, otherwise by a direct `SetInputFocus` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMethod {
    TakeFocus,
    Direct,
}

#[must_use]
pub fn focus_method(supports_take_focus: bool) -> FocusMethod {
    if supports_take_focus {
        FocusMethod::TakeFocus
    } else {
        FocusMethod::Direct
    }
}

/// Tracks the previous cycle's observable state, so the synchronizer can
/// tell whether focus, the client set, or the stacking order actually
/// changed (§4.6 steps 6/7) instead of rewriting unchanged server state
/// every single cycle.
#[derive(Debug, Default)]
pub struct SyncState {
    previous_focus: Option<WindowId>,
    previous_age_order: Vec<WindowId>,
    previous_z_order: Vec<WindowId>,
}

impl SyncState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether focus changed since the last call to [`Self::commit`].
    #[must_use]
    pub fn focus_changed(&self, current: Option<WindowId>) -> bool {
        self.previous_focus != current
    }

    /// Whether the client list (by age) or stacking order (by Z) changed
    /// since the last call to [`Self::commit`] — either one requires
    /// refreshing `_NET_CLIENT_LIST`/`_NET_CLIENT_LIST_STACKING`.
    #[must_use]
    pub fn client_list_changed(&self, age_order: &[WindowId], z_order: &[WindowId]) -> bool {
        self.previous_age_order != age_order || self.previous_z_order != z_order
    }

    /// Records this cycle's state as the baseline for the next one.
    pub fn commit(&mut self, focus: Option<WindowId>, age_order: &[WindowId], z_order: &[WindowId]) {
        self.previous_focus = focus;
        self.previous_age_order = age_order.to_vec();
        self.previous_z_order = z_order.to_vec();
    }
}

/// Runtime state for the visible system notification (§6 `[notification]`
/// collaborator referenced by §4.6 step 8). Owned by the binary crate,
/// which creates one when a `show-message`/`show-run`/`show-list` action
/// runs and clears it once [`Notification::is_expired`] says so.
#[derive(Debug, Clone, Copy)]
pub struct Notification {
    shown_at: Instant,
    duration: Duration,
}

impl Notification {
    #[must_use]
    pub fn new(shown_at: Instant, duration: Duration) -> Self {
        Self { shown_at, duration }
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

/// §4.6 step 1: recomputes every monitor's accumulated strut from the
/// registry's currently-visible dock windows and resizes each monitor's
/// root frame to the resulting usable rectangle. A thin wire-up over
/// [`MonitorSet::recompute_struts`] and [`FrameTree::resize`], since both
/// already exist as reusable primitives on their owning types.
pub fn resync_monitor_struts(monitors: &mut MonitorSet, tree: &mut FrameTree, registry: &WindowRegistry) {
    let docks = registry.by_age().iter().filter_map(|id| {
        let window = registry.get(*id)?;
        if window.mode == Mode::Dock && window.is_visible {
            window.properties.strut.map(|strut| (window.rect, strut))
        } else {
            None
        }
    });
    monitors.recompute_struts(docks);
    for monitor in monitors.iter() {
        crate::frame::sizing::resize(tree, monitor.root_frame, monitor.usable_rect(), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BorderSettings;
    use crate::geometry::Rect;

    fn colors() -> BorderSettings {
        BorderSettings {
            size: 1,
            color: 0x111111,
            active_color: 0x222222,
            focus_color: 0x333333,
        }
    }

    #[test]
    fn focused_window_gets_the_focus_color() {
        let c = colors();
        assert_eq!(border_color(WindowId(1), Some(WindowId(1)), false, false, &c), c.focus_color);
    }

    #[test]
    fn unfocused_shared_subtree_gets_the_active_color() {
        let c = colors();
        assert_eq!(border_color(WindowId(2), Some(WindowId(1)), true, false, &c), c.active_color);
    }

    #[test]
    fn plain_unfocused_window_gets_the_base_color() {
        let c = colors();
        assert_eq!(border_color(WindowId(2), Some(WindowId(1)), false, false, &c), c.color);
    }

    #[test]
    fn stacking_orders_by_mode_then_lifts_transients_above_their_parent() {
        let mut registry = WindowRegistry::new();
        let desktop = registry.create(WindowId(1), Rect::default(), 0, Mode::Desktop).unwrap();
        let tiling = registry.create(WindowId(2), Rect::default(), 1, Mode::Tiling).unwrap();
        let floating = registry.create(WindowId(3), Rect::default(), 1, Mode::Floating).unwrap();
        let dialog = registry.create(WindowId(4), Rect::default(), 1, Mode::Floating).unwrap();
        registry.get_mut(dialog).unwrap().properties.transient_for = Some(floating);

        let z_order = vec![desktop, tiling, floating, dialog];
        let stacked = compute_stacking(&registry, &z_order);
        assert_eq!(stacked, vec![desktop, tiling, floating, dialog]);
    }

    #[test]
    fn transient_window_is_lifted_even_when_it_precedes_its_parent_in_z_order() {
        let mut registry = WindowRegistry::new();
        let parent = registry.create(WindowId(1), Rect::default(), 1, Mode::Floating).unwrap();
        let child = registry.create(WindowId(2), Rect::default(), 1, Mode::Floating).unwrap();
        registry.get_mut(child).unwrap().properties.transient_for = Some(parent);

        let z_order = vec![child, parent];
        let stacked = compute_stacking(&registry, &z_order);
        assert_eq!(stacked, vec![parent, child]);
    }

    #[test]
    fn partition_visibility_splits_by_the_is_visible_flag() {
        let mut registry = WindowRegistry::new();
        let shown = registry.create(WindowId(1), Rect::default(), 1, Mode::Tiling).unwrap();
        let hidden = registry.create(WindowId(2), Rect::default(), 1, Mode::Tiling).unwrap();
        registry.show(shown).unwrap();
        let (visible, invisible) = partition_visibility(&registry);
        assert_eq!(visible, vec![shown]);
        assert_eq!(invisible, vec![hidden]);
    }

    #[test]
    fn sync_state_detects_focus_and_client_list_changes() {
        let mut state = SyncState::new();
        assert!(state.focus_changed(Some(WindowId(1))));
        state.commit(Some(WindowId(1)), &[WindowId(1)], &[WindowId(1)]);
        assert!(!state.focus_changed(Some(WindowId(1))));
        assert!(state.client_list_changed(&[WindowId(1), WindowId(2)], &[WindowId(1), WindowId(2)]));
    }

    #[test]
    fn notification_expires_after_its_duration() {
        let now = Instant::now();
        let notification = Notification::new(now, Duration::from_secs(2));
        assert!(!notification.is_expired(now));
        assert!(notification.is_expired(now + Duration::from_secs(3)));
    }
}
