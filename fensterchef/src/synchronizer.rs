//! The X11-calling half of the per-cycle synchronizer (§4.6): takes what
//! [`fensterchef_core::sync`]'s pure functions decided and pushes it to the
//! display through [`CallWrapper`], diffing against [`SyncState`] so an
//! idle cycle with nothing to say to the server does nothing. Grounded on
//! the teacher's `manager::mod`'s `Manager::remap_and_redraw` families
//! (now deleted, see `DESIGN.md`) — same idea (derive intent, commit only
//! what changed), rebuilt around `fensterchef-core`'s arena/registry
//! rather than `pgwm`'s per-workspace vectors.

use fensterchef_core::frame::Gaps;
use fensterchef_core::geometry::Rect;
use fensterchef_core::sync::{self, FocusMethod};
use fensterchef_core::window::{Mode, WmState};

use crate::error::Result;
use crate::state::State;
use crate::x11::call_wrapper::CallWrapper;

/// A leaf's client rectangle is its frame rectangle inset by its inner
/// gap; the outer gap is already folded into the rectangle by virtue of
/// sibling leaves and the monitor's usable rect stopping short of it, so
/// only `inner` needs applying here.
fn window_rect(rect: Rect, gaps: Gaps) -> Rect {
    let inner = gaps.inner;
    let x = rect.x + inner.left;
    let y = rect.y + inner.top;
    let width = rect.width.saturating_sub((inner.left + inner.right).max(0) as u32);
    let height = rect.height.saturating_sub((inner.top + inner.bottom).max(0) as u32);
    Rect::new(x, y, width, height)
}

pub(crate) fn sync(call: &CallWrapper, state: &mut State) -> Result<()> {
    sync::resync_monitor_struts(&mut state.monitors, &mut state.tree, &state.registry);

    push_geometry(call, state)?;

    let (visible, invisible) = sync::partition_visibility(&state.registry);
    for id in &invisible {
        // §4.6 steps 4-5: unmap, mark `WM_STATE` withdrawn, flag
        // `_NET_WM_STATE_HIDDEN` — every cycle, not just on first hide.
        call.unmap_window(id.0)?;
        call.set_wm_state(id.0, WmState::Withdrawn)?;
        call.set_net_wm_state_hidden(id.0, true)?;
    }
    for id in &visible {
        call.map_window(id.0)?;
        call.set_wm_state(id.0, WmState::Normal)?;
        call.set_net_wm_state_hidden(id.0, false)?;
    }

    push_stacking(call, state)?;
    push_borders(call, state)?;
    push_focus(call, state)?;

    let age_order = state.registry.by_age().to_vec();
    let z_order = state.registry.by_z().to_vec();
    if state.sync_state.client_list_changed(&age_order, &z_order) {
        let stacked = sync::compute_stacking(&state.registry, &z_order);
        call.set_client_list(&age_order.iter().map(|id| id.0).collect::<Vec<_>>())?;
        call.set_client_list_stacking(&stacked.iter().map(|id| id.0).collect::<Vec<_>>())?;
    }

    state.sync_state.commit(state.registry.focused(), &age_order, &z_order);
    Ok(())
}

/// Tiling/dock/desktop windows take their rectangle from the frame tree
/// or monitor; floating/fullscreen windows keep whatever geometry they
/// were last given (set elsewhere, e.g. by `ConfigureRequest` or
/// `set_size`).
fn push_geometry(call: &CallWrapper, state: &State) -> Result<()> {
    for id in state.registry.by_age() {
        let Some(window) = state.registry.get(*id) else { continue };
        if window.mode != Mode::Tiling {
            continue;
        }
        let Some(frame) = state.tree.find_window(*id) else { continue };
        let rect = window_rect(state.tree.rect(frame), state.tree.gaps(frame));
        call.configure_window(id.0, rect, window.border_size)?;
    }
    Ok(())
}

fn push_stacking(call: &CallWrapper, state: &State) -> Result<()> {
    let stacked = sync::compute_stacking(&state.registry, state.registry.by_z());
    for id in &stacked {
        if state.registry.get(*id).is_some_and(|w| w.is_visible) {
            call.push_window_to_top(id.0)?;
        }
    }
    Ok(())
}

fn push_borders(call: &CallWrapper, state: &State) -> Result<()> {
    let focused = state.registry.focused();
    let focused_frame = focused.and_then(|id| state.tree.find_window(id));
    for id in state.registry.by_age() {
        let Some(window) = state.registry.get(*id) else { continue };
        if window.is_borderless {
            continue;
        }
        let frame = state.tree.find_window(*id);
        let shares_subtree = match (focused_frame, frame) {
            (Some(focus_frame), Some(this_frame)) => sync::is_ancestor_or_self(&state.tree, focus_frame, this_frame) || sync::is_ancestor_or_self(&state.tree, this_frame, focus_frame),
            _ => false,
        };
        let is_top_floating = focused.is_none() && window.mode == Mode::Floating && state.registry.by_z().last() == Some(id);
        let color = sync::border_color(*id, focused, shares_subtree, is_top_floating, &state.config.border);
        call.change_border_color(id.0, color)?;
    }
    Ok(())
}

fn push_focus(call: &CallWrapper, state: &State) -> Result<()> {
    let focused = state.registry.focused();
    if !state.sync_state.focus_changed(focused) {
        return Ok(());
    }
    match focused {
        Some(id) => {
            let Some(window) = state.registry.get(id) else { return Ok(()) };
            let supports_take_focus = window.properties.protocols.contains(&fensterchef_core::window::Protocol::TakeFocus);
            match sync::focus_method(supports_take_focus) {
                FocusMethod::TakeFocus => call.send_take_focus(id.0, x11rb::CURRENT_TIME)?,
                FocusMethod::Direct => call.set_input_focus(id.0)?,
            }
            call.set_active_window(Some(id.0))?;
        }
        None => {
            call.reset_root_focus()?;
            call.set_active_window(None)?;
        }
    }
    Ok(())
}
