//! Action registry (§4.4's "action dispatch"): each action has a fixed
//! data type (void, integer, quad, string) and a numeric id the compiler
//! bakes into a `RUN_ACTION`/`RUN_VOID_ACTION` instruction's operand. The
//! handler itself lives outside this crate (it needs the frame tree, the
//! window registry and, for `run`, a process spawner); this module only
//! owns the name → id → argument-kind table the parser consults while
//! compiling an action call, grounded on `original_source/src/action.c`'s
//! `ACTION_*` id list and argument-type table.

use std::fmt;

/// The fixed argument shape an action expects, matching the four data
/// types `initialize_expression_from_action` encodes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Void,
    Integer,
    Quad,
    String,
}

/// Stable small-integer id for one action, carried as `RUN_ACTION`'s or
/// `RUN_VOID_ACTION`'s operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

/// Every action the evaluator can dispatch to. Variant order fixes
/// `ActionId`, so reordering this list is a wire-format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Quit,
    Reload,
    CloseWindow,
    KillWindow,
    ShowMessage,
    ShowRun,
    ShowList,
    Run,
    SplitHorizontally,
    SplitVertically,
    RemoveFrame,
    EqualizeHorizontally,
    EqualizeVertically,
    StashFrame,
    PopStash,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    FocusLeft,
    FocusRight,
    FocusUp,
    FocusDown,
    FocusFrame,
    ExchangeLeft,
    ExchangeRight,
    ExchangeUp,
    ExchangeDown,
    ResizeLeft,
    ResizeRight,
    ResizeUp,
    ResizeDown,
    /// `set <mode-keyword>` (§8 scenario 5, `set floating`): the parser
    /// resolves the trailing keyword (`tiling`/`floating`/`fullscreen`/
    /// `dock`) to its `Mode` discriminant at compile time, so at runtime
    /// this is just an integer argument.
    Set,
    Toggle,
    SetName,
    MoveToFrame,
    SetGaps,
    SetBorderSize,
    MergeDefault,
    NextWindow,
    PreviousWindow,
}

/// `Action::ALL` in declaration order; `ActionId(i)` names `ALL[i]`.
const ALL: &[Action] = &[
    Action::Quit,
    Action::Reload,
    Action::CloseWindow,
    Action::KillWindow,
    Action::ShowMessage,
    Action::ShowRun,
    Action::ShowList,
    Action::Run,
    Action::SplitHorizontally,
    Action::SplitVertically,
    Action::RemoveFrame,
    Action::EqualizeHorizontally,
    Action::EqualizeVertically,
    Action::StashFrame,
    Action::PopStash,
    Action::MoveLeft,
    Action::MoveRight,
    Action::MoveUp,
    Action::MoveDown,
    Action::FocusLeft,
    Action::FocusRight,
    Action::FocusUp,
    Action::FocusDown,
    Action::FocusFrame,
    Action::ExchangeLeft,
    Action::ExchangeRight,
    Action::ExchangeUp,
    Action::ExchangeDown,
    Action::ResizeLeft,
    Action::ResizeRight,
    Action::ResizeUp,
    Action::ResizeDown,
    Action::Set,
    Action::Toggle,
    Action::SetName,
    Action::MoveToFrame,
    Action::SetGaps,
    Action::SetBorderSize,
    Action::MergeDefault,
    Action::NextWindow,
    Action::PreviousWindow,
];

impl Action {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::Reload => "reload",
            Action::CloseWindow => "close-window",
            Action::KillWindow => "kill-window",
            Action::ShowMessage => "show-message",
            Action::ShowRun => "show-run",
            Action::ShowList => "show-list",
            Action::Run => "run",
            Action::SplitHorizontally => "split-horizontally",
            Action::SplitVertically => "split-vertically",
            Action::RemoveFrame => "remove-frame",
            Action::EqualizeHorizontally => "equalize-horizontally",
            Action::EqualizeVertically => "equalize-vertically",
            Action::StashFrame => "stash-frame",
            Action::PopStash => "pop-stash",
            Action::MoveLeft => "move-left",
            Action::MoveRight => "move-right",
            Action::MoveUp => "move-up",
            Action::MoveDown => "move-down",
            Action::FocusLeft => "focus-left",
            Action::FocusRight => "focus-right",
            Action::FocusUp => "focus-up",
            Action::FocusDown => "focus-down",
            Action::FocusFrame => "focus-frame",
            Action::ExchangeLeft => "exchange-left",
            Action::ExchangeRight => "exchange-right",
            Action::ExchangeUp => "exchange-up",
            Action::ExchangeDown => "exchange-down",
            Action::ResizeLeft => "resize-left",
            Action::ResizeRight => "resize-right",
            Action::ResizeUp => "resize-up",
            Action::ResizeDown => "resize-down",
            Action::Set => "set",
            Action::Toggle => "toggle",
            Action::SetName => "set-name",
            Action::MoveToFrame => "move-to-frame",
            Action::SetGaps => "set-gaps",
            Action::SetBorderSize => "set-border-size",
            Action::MergeDefault => "merge-default",
            Action::NextWindow => "next-window",
            Action::PreviousWindow => "previous-window",
        }
    }

    #[must_use]
    pub fn arg_kind(self) -> ArgKind {
        match self {
            Action::ShowMessage | Action::Run => ArgKind::String,
            Action::FocusFrame
            | Action::ResizeLeft
            | Action::ResizeRight
            | Action::ResizeUp
            | Action::ResizeDown
            | Action::Set
            | Action::Toggle
            | Action::SetName
            | Action::MoveToFrame
            | Action::SetBorderSize => ArgKind::Integer,
            Action::SetGaps => ArgKind::Quad,
            _ => ArgKind::Void,
        }
    }

    /// Whether this action also compiles as `RUN_VOID_ACTION` when its
    /// argument is syntactically absent (§4.4's "declares the argument
    /// optional") — the resize family defaults to the configured step.
    #[must_use]
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Action::ResizeLeft | Action::ResizeRight | Action::ResizeUp | Action::ResizeDown
        )
    }

    #[must_use]
    pub fn id(self) -> ActionId {
        ActionId(ALL.iter().position(|a| *a == self).expect("every Action is in ALL") as u32)
    }

    #[must_use]
    pub fn from_id(id: ActionId) -> Option<Self> {
        ALL.get(id.0 as usize).copied()
    }

    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        ALL.iter().find(|a| a.name() == name).copied()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The argument handed to a `RUN_ACTION` handler once the bytecode
/// argument expression has been evaluated into its declared shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionValue {
    Integer(i32),
    Quad(crate::geometry::Quad),
    String(String),
}

/// Resolves the keyword following `set`/`toggle` (§8 scenario 5: `set
/// floating`) to the integer the parser compiles as that call's literal
/// argument — `crate::window::Mode::as_i32`.
#[must_use]
pub fn mode_keyword(name: &str) -> Option<i32> {
    use crate::window::Mode;
    Some(match name {
        "tiling" => Mode::Tiling,
        "floating" => Mode::Floating,
        "fullscreen" => Mode::Fullscreen,
        "dock" => Mode::Dock,
        "desktop" => Mode::Desktop,
        _ => return None,
    }
    .as_i32())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_round_trips_by_name_and_id() {
        for action in [Action::Quit, Action::SplitHorizontally, Action::ResizeLeft, Action::ShowMessage] {
            assert_eq!(Action::by_name(action.name()), Some(action));
            assert_eq!(Action::from_id(action.id()), Some(action));
        }
    }

    #[test]
    fn void_actions_do_not_require_an_argument() {
        assert_eq!(Action::Quit.arg_kind(), ArgKind::Void);
        assert_eq!(Action::ShowMessage.arg_kind(), ArgKind::String);
        assert_eq!(Action::SetGaps.arg_kind(), ArgKind::Quad);
    }

    #[test]
    fn mode_keyword_round_trips_through_mode() {
        use crate::window::Mode;
        assert_eq!(mode_keyword("floating"), Some(Mode::Floating.as_i32()));
        assert_eq!(mode_keyword("nonsense"), None);
    }

    #[test]
    fn action_ids_are_dense_and_match_all_order() {
        for (i, action) in ALL.iter().enumerate() {
            assert_eq!(action.id(), ActionId(i as u32));
        }
    }
}
