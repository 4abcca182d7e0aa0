//! Key and button binding tables (§3.6). Grounded on
//! `configuration_structure.h`'s `configuration_key`/`configuration_button`
//! and on the pgwm teacher's own binding lookup
//! (`pgwm-core/src/config/key_map.rs`, `mouse_map.rs`): bindings are
//! searched newest-first so a later `[keyboard]`/`[mouse]` entry with an
//! identical trigger shadows an earlier one, and an incoming modifier state
//! has the configured "ignore" mask subtracted before matching.

use crate::expr::Bytecode;

/// A modifier mask, bit-compatible with the X11 `KeyButMask`/`ModMask`
/// values the binary crate decodes events into. Kept opaque here (not an
/// X11 type) so this crate never depends on `x11rb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Modifiers(pub u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);

    #[must_use]
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Subtracts `ignore` from `self` (§3.6: the ignored-modifiers mask,
    /// default lock+numlock, is removed from the incoming state before a
    /// binding lookup compares it against a trigger's modifiers).
    #[must_use]
    pub fn without(self, ignore: Modifiers) -> Modifiers {
        Modifiers(self.0 & !ignore.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// `configuration_key`'s flag bits: whether the binding fires on press,
/// release, or both, and whether a repeat should re-trigger it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyFlags {
    pub on_release: bool,
    pub transparent: bool,
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub modifiers: Modifiers,
    pub key_symbol: u32,
    pub flags: KeyFlags,
    pub action: Bytecode,
}

/// `configuration_button`'s flag bits: transparent bindings let the click
/// also pass through to the window underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonFlags {
    pub transparent: bool,
}

#[derive(Debug, Clone)]
pub struct ButtonBinding {
    pub modifiers: Modifiers,
    pub button_index: u8,
    pub flags: ButtonFlags,
    pub action: Bytecode,
}

/// Finds the binding matching `modifiers`/`key_symbol` once `ignore` has
/// been subtracted from `modifiers`, searching from the end of `bindings`
/// so a later (redefining) entry wins (§3.6).
#[must_use]
pub fn find_key<'a>(
    bindings: &'a [KeyBinding],
    ignore: Modifiers,
    modifiers: Modifiers,
    key_symbol: u32,
) -> Option<&'a KeyBinding> {
    let effective = modifiers.without(ignore);
    bindings
        .iter()
        .rev()
        .find(|b| b.modifiers == effective && b.key_symbol == key_symbol)
}

#[must_use]
pub fn find_button<'a>(
    bindings: &'a [ButtonBinding],
    ignore: Modifiers,
    modifiers: Modifiers,
    button_index: u8,
) -> Option<&'a ButtonBinding> {
    let effective = modifiers.without(ignore);
    bindings
        .iter()
        .rev()
        .find(|b| b.modifiers == effective && b.button_index == button_index)
}

/// Inserts or replaces a key binding by trigger (§4.5: "existing bindings
/// with an identical trigger are replaced in place" rather than shadowed by
/// append, so later lookups don't pay for a growing list of dead entries).
pub fn upsert_key(bindings: &mut Vec<KeyBinding>, binding: KeyBinding) {
    if let Some(existing) = bindings
        .iter_mut()
        .find(|b| b.modifiers == binding.modifiers && b.key_symbol == binding.key_symbol)
    {
        *existing = binding;
    } else {
        bindings.push(binding);
    }
}

pub fn upsert_button(bindings: &mut Vec<ButtonBinding>, binding: ButtonBinding) {
    if let Some(existing) = bindings
        .iter_mut()
        .find(|b| b.modifiers == binding.modifiers && b.button_index == binding.button_index)
    {
        *existing = binding;
    } else {
        bindings.push(binding);
    }
}

/// Raw X11 keysym values for the handful of keys the defaults below bind
/// (`<X11/keysymdef.h>`; Latin letters and digits share their ASCII code
/// point, the arrow keys don't).
mod keysym {
    pub const Q: u32 = 0x0071;
    pub const R: u32 = 0x0072;
    pub const N: u32 = 0x006e;
    pub const P: u32 = 0x0070;
    pub const V: u32 = 0x0076;
    pub const S: u32 = 0x0073;
    pub const K: u32 = 0x006b;
    pub const H: u32 = 0x0068;
    pub const L: u32 = 0x006c;
    pub const J: u32 = 0x006a;
    pub const W: u32 = 0x0077;
    pub const EQUAL: u32 = 0x003d;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
}

fn void_action(action: crate::expr::actions::Action) -> Bytecode {
    use crate::expr::bytecode::{word, Opcode};
    let mut code = Bytecode::new();
    code.emit(word(Opcode::RunVoidAction, action.id().0));
    code
}

/// `merge-default`'s key-binding table (§4.5), grounded on
/// `original_source/src/default_configuration.c`'s
/// `merge_with_default_key_bindings`, trimmed to the actions this crate's
/// registry actually defines (no interactive window-minimize binding, no
/// `focus-parent`/`focus-child` family — this crate's frame tree has no
/// counterpart for either, an intentional drop recorded in `DESIGN.md`).
/// Modifiers are bare here; the parser ORs in the configured
/// `[keyboard] modifiers` before comparing or storing them.
#[must_use]
pub fn default_keys() -> Vec<KeyBinding> {
    use crate::expr::actions::Action;

    const SHIFT: Modifiers = Modifiers(1 << 0);
    const NONE: Modifiers = Modifiers::NONE;

    let key = |modifiers: Modifiers, key_symbol: u32, action: Action| KeyBinding {
        modifiers,
        key_symbol,
        flags: KeyFlags::default(),
        action: void_action(action),
    };

    vec![
        key(SHIFT, keysym::R, Action::Reload),
        key(NONE, keysym::R, Action::RemoveFrame),
        key(NONE, keysym::Q, Action::CloseWindow),
        key(NONE, keysym::N, Action::NextWindow),
        key(NONE, keysym::P, Action::PreviousWindow),
        key(NONE, keysym::EQUAL, Action::EqualizeHorizontally),
        key(SHIFT, keysym::EQUAL, Action::EqualizeVertically),
        key(NONE, keysym::V, Action::SplitHorizontally),
        key(NONE, keysym::S, Action::SplitVertically),
        key(NONE, keysym::K, Action::FocusUp),
        key(NONE, keysym::H, Action::FocusLeft),
        key(NONE, keysym::L, Action::FocusRight),
        key(NONE, keysym::J, Action::FocusDown),
        key(SHIFT, keysym::K, Action::ExchangeUp),
        key(SHIFT, keysym::H, Action::ExchangeLeft),
        key(SHIFT, keysym::L, Action::ExchangeRight),
        key(SHIFT, keysym::J, Action::ExchangeDown),
        key(NONE, keysym::LEFT, Action::ResizeLeft),
        key(NONE, keysym::UP, Action::ResizeUp),
        key(NONE, keysym::RIGHT, Action::ResizeRight),
        key(NONE, keysym::DOWN, Action::ResizeDown),
        key(NONE, keysym::W, Action::ShowList),
    ]
}

/// `merge-default`'s button-binding table. The original's defaults bind
/// interactive move/resize drags and a minimize action; this crate's
/// action registry models neither (dropped as out of scope, see
/// `DESIGN.md`), so there is nothing left to merge in by default — the
/// command still succeeds, it just has an empty table to draw from.
#[must_use]
pub fn default_buttons() -> Vec<ButtonBinding> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(modifiers: u16, key: u32) -> KeyBinding {
        KeyBinding {
            modifiers: Modifiers(modifiers),
            key_symbol: key,
            flags: KeyFlags::default(),
            action: Bytecode::new(),
        }
    }

    #[test]
    fn later_binding_with_identical_trigger_replaces_the_earlier_one() {
        let mut bindings = vec![binding(0, 1)];
        upsert_key(&mut bindings, binding(0, 1));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn lookup_subtracts_the_ignored_modifier_mask() {
        let bindings = vec![binding(8, 1)];
        let lock = Modifiers(2);
        let found = find_key(&bindings, lock, Modifiers(8 | 2), 1);
        assert!(found.is_some());
    }

    #[test]
    fn lookup_prefers_the_most_recently_inserted_match() {
        let bindings = vec![binding(0, 1), binding(0, 1)];
        assert!(std::ptr::eq(
            find_key(&bindings, Modifiers::NONE, Modifiers(0), 1).unwrap(),
            &bindings[1]
        ));
    }

    #[test]
    fn default_keys_has_no_duplicate_trigger() {
        let defaults = default_keys();
        let mut merged = Vec::new();
        for binding in defaults.iter().cloned() {
            upsert_key(&mut merged, binding);
        }
        assert_eq!(merged.len(), default_keys().len());
    }
}
