//! The window registry (§4.2): creation/destruction, mode transitions,
//! sizing, focus and Z-order, built over a `Vec` + index-map pair in the
//! teacher's style (`pgwm_core::state::workspace::Workspaces` keeps a flat
//! `Vec<Workspace>` alongside a `Map<Window, usize>` rather than an
//! intrusive pointer list); the three "intrusive lists" of §3.3 are
//! realized here as three index orderings over the same `Vec`, not as
//! pointer fields on `Window` itself.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::geometry::Rect;

use super::{Mode, Window, WindowId};

#[derive(Debug)]
struct Slot {
    window: Window,
}

/// Owns every registered window and the three orderings over them.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    slots: HashMap<WindowId, Slot>,
    /// Oldest-to-newest; `_NET_CLIENT_LIST` order.
    age_order: Vec<WindowId>,
    /// Bottom-to-top; `_NET_CLIENT_LIST_STACKING` order.
    z_order: Vec<WindowId>,
    focus: Option<WindowId>,
    previously_focused: Vec<WindowId>,
    /// The smallest number `next_number` will ever hand out, set from
    /// `[assignment]`'s `first-window-number` (§4.5).
    number_floor: u32,
}

impl WindowRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            number_floor: 1,
            ..Self::default()
        }
    }

    /// Overrides the numbering floor `next_number` counts up from,
    /// e.g. from `[assignment]`'s `first-window-number` setting.
    pub fn set_number_floor(&mut self, floor: u32) {
        self.number_floor = floor.max(1);
    }

    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.slots.get(&id).map(|s| &s.window)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.slots.get_mut(&id).map(|s| &mut s.window)
    }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Age-ordered client list, oldest first.
    #[must_use]
    pub fn by_age(&self) -> &[WindowId] {
        &self.age_order
    }

    /// Z-ordered stacking list, bottom first.
    #[must_use]
    pub fn by_z(&self) -> &[WindowId] {
        &self.z_order
    }

    #[must_use]
    pub fn focused(&self) -> Option<WindowId> {
        self.focus
    }

    /// The smallest positive integer not currently assigned to a live
    /// window — the numbering discipline of §3.3.
    #[must_use]
    pub fn next_number(&self) -> u32 {
        let mut used: Vec<u32> = self.slots.values().map(|s| s.window.number).collect();
        used.sort_unstable();
        let mut candidate = self.number_floor;
        for n in used.drain(..) {
            if n == candidate {
                candidate += 1;
            } else if n > candidate {
                break;
            }
        }
        candidate
    }

    /// Registers a freshly mapped window with the next free number,
    /// appending it to the age and Z orders. Mode classification,
    /// association matching and the initial show/hide decision are the
    /// caller's responsibility (§4.2 describes them as part of `create`,
    /// but they need the parser/association tables this crate's registry
    /// does not own).
    pub fn create(&mut self, id: WindowId, rect: Rect, border_size: u32, mode: Mode) -> Result<WindowId> {
        if self.slots.contains_key(&id) {
            return Err(Error::AlreadyRegistered(id.0));
        }
        let window = Window {
            id,
            number: self.next_number(),
            created_at: Instant::now(),
            rect,
            border_size,
            mode,
            previous_mode: None,
            is_visible: false,
            is_borderless: false,
            wm_state: super::WmState::Withdrawn,
            close_requested_at: None,
            properties: super::Properties::default(),
        };
        self.slots.insert(id, Slot { window });
        self.age_order.push(id);
        self.z_order.push(id);
        Ok(id)
    }

    /// Removes `id` from every ordering and cached state; if it was
    /// focused, focus falls back to the most recently focused surviving
    /// window (§4.2's "hiding a focused window transfers focus to the
    /// previously focused window in the focus chain").
    pub fn destroy(&mut self, id: WindowId) -> Result<()> {
        if self.slots.remove(&id).is_none() {
            return Err(Error::UnknownWindow(id.0));
        }
        self.age_order.retain(|w| *w != id);
        self.z_order.retain(|w| *w != id);
        self.previously_focused.retain(|w| *w != id);
        if self.focus == Some(id) {
            self.focus = self.previously_focused.pop();
        }
        Ok(())
    }

    /// Transitions `id` to `new_mode`, remembering the previous mode.
    /// Whether this also inserts into or removes from a frame is the
    /// caller's responsibility — the registry only tracks the mode value
    /// itself, since frame membership lives in the `FrameTree`, a sibling
    /// structure this registry does not own.
    pub fn set_mode(&mut self, id: WindowId, new_mode: Mode) -> Result<Mode> {
        let slot = self.slots.get_mut(&id).ok_or(Error::UnknownWindow(id.0))?;
        let previous = slot.window.mode;
        slot.window.previous_mode = Some(previous);
        slot.window.mode = new_mode;
        Ok(previous)
    }

    /// Overrides a window's assigned number, e.g. to the target number an
    /// `[assignment]` rule names (§4.5: "the window's assigned number
    /// starts at the given value"). Callers are responsible for picking a
    /// sensible value; the registry does not check it against other live
    /// windows' numbers.
    pub fn set_number(&mut self, id: WindowId, number: u32) -> Result<()> {
        let slot = self.slots.get_mut(&id).ok_or(Error::UnknownWindow(id.0))?;
        slot.window.number = number;
        Ok(())
    }

    /// Updates the focused window, pushing the previous focus onto the
    /// focus-chain history used by `hide`'s fallback. Refuses windows that
    /// cannot accept focus (§4.2).
    pub fn focus(&mut self, id: Option<WindowId>) -> Result<()> {
        if let Some(id) = id {
            let window = self.get(id).ok_or(Error::UnknownWindow(id.0))?;
            if !window.accepts_focus() {
                return Ok(());
            }
        }
        if let Some(old) = self.focus {
            self.previously_focused.retain(|w| *w != old);
            self.previously_focused.push(old);
        }
        self.focus = id;
        Ok(())
    }

    /// Restacks `id` per `update_layer` (§4.2): tiling windows sink to the
    /// bottom of Z-order, everything else rises to the top; transient
    /// windows are then immediately placed above their target by a
    /// follow-up `restack_transient` call (kept separate since it needs to
    /// run after every window's base layer is settled).
    pub fn restack_by_mode(&mut self, id: WindowId) -> Result<()> {
        let mode = self.get(id).ok_or(Error::UnknownWindow(id.0))?.mode;
        self.z_order.retain(|w| *w != id);
        if mode == Mode::Tiling {
            self.z_order.insert(0, id);
        } else {
            self.z_order.push(id);
        }
        Ok(())
    }

    /// Moves `child` to immediately above `parent` in Z-order, per the
    /// transient-for discipline of `update_layer`.
    pub fn restack_transient_above(&mut self, child: WindowId, parent: WindowId) {
        self.z_order.retain(|w| *w != child);
        let Some(pos) = self.z_order.iter().position(|w| *w == parent) else {
            self.z_order.push(child);
            return;
        };
        self.z_order.insert(pos + 1, child);
    }

    pub fn show(&mut self, id: WindowId) -> Result<()> {
        self.get_mut(id).ok_or(Error::UnknownWindow(id.0))?.is_visible = true;
        Ok(())
    }

    /// Hides `id`; if it was focused, focus transfers to the previously
    /// focused surviving window.
    pub fn hide(&mut self, id: WindowId) -> Result<()> {
        self.get_mut(id).ok_or(Error::UnknownWindow(id.0))?.is_visible = false;
        if self.focus == Some(id) {
            let fallback = self.previously_focused.pop();
            self.focus = fallback;
        }
        Ok(())
    }

    /// Whether `id` is still registered, in tiling mode and hidden — the
    /// stash's validity check for a stashed window reference (§3.2),
    /// mirroring `is_window_valid`/`validate_inner_windows`.
    #[must_use]
    pub fn is_valid_hidden_tiling(&self, id: WindowId) -> bool {
        self.get(id)
            .is_some_and(|w| w.mode == Mode::Tiling && !w.is_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_fill_the_smallest_gap() {
        let mut reg = WindowRegistry::new();
        let a = reg.create(WindowId(1), Rect::default(), 1, Mode::Tiling).unwrap();
        let b = reg.create(WindowId(2), Rect::default(), 1, Mode::Tiling).unwrap();
        assert_eq!(reg.get(a).unwrap().number, 1);
        assert_eq!(reg.get(b).unwrap().number, 2);
        reg.destroy(a).unwrap();
        let c = reg.create(WindowId(3), Rect::default(), 1, Mode::Tiling).unwrap();
        assert_eq!(reg.get(c).unwrap().number, 1);
    }

    #[test]
    fn hiding_focused_window_falls_back_to_previous_focus() {
        let mut reg = WindowRegistry::new();
        let a = reg.create(WindowId(1), Rect::default(), 1, Mode::Tiling).unwrap();
        let b = reg.create(WindowId(2), Rect::default(), 1, Mode::Tiling).unwrap();
        reg.focus(Some(a)).unwrap();
        reg.focus(Some(b)).unwrap();
        reg.hide(b).unwrap();
        assert_eq!(reg.focused(), Some(a));
    }

    #[test]
    fn set_number_overrides_an_assigned_number() {
        let mut reg = WindowRegistry::new();
        let a = reg.create(WindowId(1), Rect::default(), 1, Mode::Tiling).unwrap();
        reg.set_number(a, 5).unwrap();
        assert_eq!(reg.get(a).unwrap().number, 5);
    }

    #[test]
    fn number_floor_raises_the_starting_number() {
        let mut reg = WindowRegistry::new();
        reg.set_number_floor(10);
        let a = reg.create(WindowId(1), Rect::default(), 1, Mode::Tiling).unwrap();
        assert_eq!(reg.get(a).unwrap().number, 10);
    }

    #[test]
    fn tiling_windows_restack_to_the_bottom() {
        let mut reg = WindowRegistry::new();
        let a = reg.create(WindowId(1), Rect::default(), 1, Mode::Floating).unwrap();
        let b = reg.create(WindowId(2), Rect::default(), 1, Mode::Tiling).unwrap();
        reg.restack_by_mode(b).unwrap();
        assert_eq!(reg.by_z(), &[b, a]);
    }
}
