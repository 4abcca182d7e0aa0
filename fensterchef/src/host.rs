//! Implements [`fensterchef_core::expr::eval::ActionHost`] for the running
//! window manager: every binding and startup expression ultimately bottoms
//! out in one of these dispatch arms. Grounded on the teacher's
//! `manager::mod::exec_action`'s big match over `Action`/`Command` (now
//! deleted, see `DESIGN.md`), rewired onto `fensterchef-core`'s frame/window
//! free functions instead of the teacher's `heapless`-backed layout tree.

use fensterchef_core::expr::actions::{Action, ActionValue};
use fensterchef_core::expr::eval::ActionHost;
use fensterchef_core::frame::{moving, sizing, splitting, stash, FrameId, Gaps};
use fensterchef_core::geometry::{Direction, SplitDirection};
use fensterchef_core::window::Mode;

use crate::state::{PendingControl, State};

pub(crate) struct Host<'a> {
    pub(crate) state: &'a mut State,
}

impl<'a> Host<'a> {
    fn find_frame_by_name(&self, name: u32) -> Option<FrameId> {
        let mut found = None;
        for monitor in self.state.monitors.iter() {
            self.state.tree.walk(monitor.root_frame, &mut |id| {
                if found.is_none() && self.state.tree.name(id) == Some(name) {
                    found = Some(id);
                }
            });
        }
        found
    }

    fn direction_move(&mut self, direction: Direction) {
        let config = self.state.config.tiling;
        let _ = moving::move_frame(
            &mut self.state.tree,
            &self.state.monitors,
            &mut self.state.stash,
            &self.state.registry,
            self.state.selected_frame,
            direction,
            config.auto_equalize,
            config.auto_remove_void,
            config.auto_fill_void,
        );
    }

    fn direction_focus(&mut self, direction: Direction) {
        let target = match direction {
            Direction::Left => moving::get_left_frame(&self.state.tree, self.state.selected_frame),
            Direction::Right => moving::get_right_frame(&self.state.tree, self.state.selected_frame),
            Direction::Up => moving::get_above_frame(&self.state.tree, self.state.selected_frame),
            Direction::Down => moving::get_below_frame(&self.state.tree, self.state.selected_frame),
        };
        if let Some(target) = target {
            self.state.selected_frame = target;
        }
    }

    fn direction_exchange(&mut self, direction: Direction) {
        let target = match direction {
            Direction::Left => moving::get_left_frame(&self.state.tree, self.state.selected_frame),
            Direction::Right => moving::get_right_frame(&self.state.tree, self.state.selected_frame),
            Direction::Up => moving::get_above_frame(&self.state.tree, self.state.selected_frame),
            Direction::Down => moving::get_below_frame(&self.state.tree, self.state.selected_frame),
        };
        if let Some(target) = target {
            let auto_remove_void = self.state.config.tiling.auto_remove_void;
            let _ = moving::exchange(&mut self.state.tree, auto_remove_void, self.state.selected_frame, target);
        }
    }

    fn direction_resize(&mut self, direction: Direction, amount: i32) {
        sizing::bump_edge(&mut self.state.tree, self.state.selected_frame, direction, amount);
    }

    fn split(&mut self, direction: SplitDirection) {
        let tiling = self.state.config.tiling;
        if let Ok((_inner, focused)) = splitting::split(
            &mut self.state.tree,
            self.state.selected_frame,
            None,
            fensterchef_core::geometry::Side::Right,
            direction,
            tiling.auto_equalize,
            true,
        ) {
            self.state.selected_frame = focused;
        }
    }

    fn set_mode(&mut self, value: i32) -> i32 {
        let Some(mode) = Mode::from_i32(value) else {
            return 0;
        };
        let Some(focused) = self.state.registry.focused() else {
            return 0;
        };
        if self.state.registry.set_mode(focused, mode).is_ok() {
            1
        } else {
            0
        }
    }

    fn toggle_mode(&mut self, value: i32) -> i32 {
        let Some(mode) = Mode::from_i32(value) else {
            return 0;
        };
        let Some(focused) = self.state.registry.focused() else {
            return 0;
        };
        let Some(window) = self.state.registry.get(focused) else {
            return 0;
        };
        let target = if window.mode == mode {
            window.previous_mode.unwrap_or(Mode::Tiling)
        } else {
            mode
        };
        if self.state.registry.set_mode(focused, target).is_ok() {
            1
        } else {
            0
        }
    }

    fn merge_default(&mut self) -> i32 {
        use fensterchef_core::config::bindings::{default_buttons, default_keys, find_button, find_key};

        let ignore = self.state.config.keyboard.ignore_modifiers;
        let mut added = 0;
        for binding in default_keys() {
            if find_key(&self.state.config.keyboard.keys, ignore, binding.modifiers, binding.key_symbol).is_none() {
                self.state.config.keyboard.keys.push(binding);
                added += 1;
            }
        }
        let ignore = self.state.config.mouse.ignore_modifiers;
        for binding in default_buttons() {
            if find_button(&self.state.config.mouse.buttons, ignore, binding.modifiers, binding.button_index).is_none() {
                self.state.config.mouse.buttons.push(binding);
                added += 1;
            }
        }
        added
    }

    fn cycle_focus(&mut self, forward: bool) -> i32 {
        let candidates: Vec<_> = self
            .state
            .registry
            .by_age()
            .iter()
            .copied()
            .filter(|id| self.state.registry.get(*id).is_some_and(|w| w.is_visible && w.accepts_focus()))
            .collect();
        if candidates.is_empty() {
            return 0;
        }
        let current = self.state.registry.focused();
        let next = match current.and_then(|c| candidates.iter().position(|id| *id == c)) {
            Some(index) if forward => candidates[(index + 1) % candidates.len()],
            Some(index) => candidates[(index + candidates.len() - 1) % candidates.len()],
            None => candidates[0],
        };
        match self.state.registry.focus(Some(next)) {
            Ok(()) => 1,
            Err(_) => 0,
        }
    }
}

impl<'a> ActionHost for Host<'a> {
    fn run_void_action(&mut self, action: Action) -> i32 {
        match action {
            Action::Quit => {
                self.state.pending_control = Some(PendingControl::Quit);
                1
            }
            Action::Reload => {
                self.state.pending_control = Some(PendingControl::Reload);
                1
            }
            Action::CloseWindow => {
                // Actual `WM_DELETE_WINDOW`/`KillClient` delivery happens in
                // `wm.rs`, which has the X11 connection this crate does
                // not; queue the target and let it run the two-strike
                // policy after this evaluator returns.
                match self.state.registry.focused() {
                    Some(id) => {
                        self.state.pending_close.push(id);
                        1
                    }
                    None => 0,
                }
            }
            Action::KillWindow => match self.state.registry.focused() {
                Some(id) => {
                    self.state.pending_kill.push(id);
                    1
                }
                None => 0,
            },
            Action::ShowRun | Action::ShowList => {
                tracing::debug!(?action, "notification widget not implemented, logging instead");
                0
            }
            Action::Run => 0,
            Action::SplitHorizontally => {
                self.split(SplitDirection::Horizontal);
                1
            }
            Action::SplitVertically => {
                self.split(SplitDirection::Vertical);
                1
            }
            Action::RemoveFrame => {
                let auto_remove_void = self.state.config.tiling.auto_remove_void;
                let parent = self.state.tree.parent(self.state.selected_frame);
                if parent.is_some() && splitting::remove(&mut self.state.tree, self.state.selected_frame, auto_remove_void).is_ok() {
                    if let Some(parent) = parent {
                        self.state.selected_frame = parent;
                    }
                    1
                } else {
                    0
                }
            }
            Action::EqualizeHorizontally => {
                sizing::equalize(&mut self.state.tree, self.state.selected_frame, SplitDirection::Horizontal);
                1
            }
            Action::EqualizeVertically => {
                sizing::equalize(&mut self.state.tree, self.state.selected_frame, SplitDirection::Vertical);
                1
            }
            Action::StashFrame => i32::from(stash::stash(&mut self.state.tree, &mut self.state.stash, self.state.selected_frame)),
            Action::PopStash => i32::from(stash::fill_void_with_stash(
                &mut self.state.tree,
                &mut self.state.stash,
                &self.state.registry,
                self.state.selected_frame,
            )),
            Action::MoveLeft => {
                self.direction_move(Direction::Left);
                1
            }
            Action::MoveRight => {
                self.direction_move(Direction::Right);
                1
            }
            Action::MoveUp => {
                self.direction_move(Direction::Up);
                1
            }
            Action::MoveDown => {
                self.direction_move(Direction::Down);
                1
            }
            Action::FocusLeft => {
                self.direction_focus(Direction::Left);
                1
            }
            Action::FocusRight => {
                self.direction_focus(Direction::Right);
                1
            }
            Action::FocusUp => {
                self.direction_focus(Direction::Up);
                1
            }
            Action::FocusDown => {
                self.direction_focus(Direction::Down);
                1
            }
            Action::ExchangeLeft => {
                self.direction_exchange(Direction::Left);
                1
            }
            Action::ExchangeRight => {
                self.direction_exchange(Direction::Right);
                1
            }
            Action::ExchangeUp => {
                self.direction_exchange(Direction::Up);
                1
            }
            Action::ExchangeDown => {
                self.direction_exchange(Direction::Down);
                1
            }
            Action::ResizeLeft => {
                self.direction_resize(Direction::Left, 10);
                1
            }
            Action::ResizeRight => {
                self.direction_resize(Direction::Right, 10);
                1
            }
            Action::ResizeUp => {
                self.direction_resize(Direction::Up, 10);
                1
            }
            Action::ResizeDown => {
                self.direction_resize(Direction::Down, 10);
                1
            }
            Action::MergeDefault => self.merge_default(),
            Action::NextWindow => self.cycle_focus(true),
            Action::PreviousWindow => self.cycle_focus(false),
            // Void calls of actions that actually take an argument (only
            // reachable for the resize family, the only actions
            // `Action::is_optional` allows) fall through to their default.
            Action::FocusFrame | Action::Set | Action::Toggle | Action::SetName | Action::MoveToFrame | Action::SetGaps | Action::SetBorderSize | Action::ShowMessage => 0,
        }
    }

    fn run_action(&mut self, action: Action, value: ActionValue) -> i32 {
        match action {
            Action::ShowMessage => {
                if let ActionValue::String(text) = value {
                    tracing::info!(%text, "show-message (notification widget not implemented)");
                    let duration = std::time::Duration::from_secs(self.state.config.notification.duration.max(0) as u64);
                    self.state.notification = Some(fensterchef_core::sync::Notification::new(std::time::Instant::now(), duration));
                    1
                } else {
                    0
                }
            }
            Action::Run => {
                if let ActionValue::String(command) = value {
                    crate::spawn::spawn(&command).is_ok() as i32
                } else {
                    0
                }
            }
            Action::FocusFrame => {
                if let ActionValue::Integer(name) = value {
                    if let Some(frame) = self.find_frame_by_name(name as u32) {
                        self.state.selected_frame = frame;
                        1
                    } else {
                        0
                    }
                } else {
                    0
                }
            }
            Action::ResizeLeft => self.resize_with_arg(Direction::Left, value),
            Action::ResizeRight => self.resize_with_arg(Direction::Right, value),
            Action::ResizeUp => self.resize_with_arg(Direction::Up, value),
            Action::ResizeDown => self.resize_with_arg(Direction::Down, value),
            Action::Set => {
                if let ActionValue::Integer(v) = value {
                    self.set_mode(v)
                } else {
                    0
                }
            }
            Action::Toggle => {
                if let ActionValue::Integer(v) = value {
                    self.toggle_mode(v)
                } else {
                    0
                }
            }
            Action::SetName => {
                if let ActionValue::Integer(v) = value {
                    self.state.tree.set_name(self.state.selected_frame, Some(v as u32));
                    1
                } else {
                    0
                }
            }
            Action::MoveToFrame => {
                if let ActionValue::Integer(name) = value {
                    let Some(target) = self.find_frame_by_name(name as u32) else {
                        return 0;
                    };
                    let Some(window) = self.state.tree.window(self.state.selected_frame) else {
                        return 0;
                    };
                    if self.state.tree.set_window(target, Some(window)).is_ok()
                        && self.state.tree.set_window(self.state.selected_frame, None).is_ok()
                    {
                        1
                    } else {
                        0
                    }
                } else {
                    0
                }
            }
            Action::SetBorderSize => {
                if let ActionValue::Integer(v) = value {
                    if let Some(focused) = self.state.registry.focused() {
                        if let Some(window) = self.state.registry.get_mut(focused) {
                            window.border_size = v.max(0) as u32;
                            return 1;
                        }
                    }
                    0
                } else {
                    0
                }
            }
            Action::SetGaps => {
                if let ActionValue::Quad(quad) = value {
                    let gaps = Gaps { inner: quad, outer: self.state.tree.gaps(self.state.selected_frame).outer };
                    self.state.tree.set_gaps(self.state.selected_frame, gaps);
                    1
                } else {
                    0
                }
            }
            _ => self.run_void_action(action),
        }
    }
}

impl<'a> Host<'a> {
    fn resize_with_arg(&mut self, direction: Direction, value: ActionValue) -> i32 {
        let amount = match value {
            ActionValue::Integer(v) => v,
            _ => 10,
        };
        self.direction_resize(direction, amount);
        1
    }
}
