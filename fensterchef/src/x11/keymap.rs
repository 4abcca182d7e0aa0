//! Keysym ↔ keycode translation, the one piece of display-dependent key
//! handling `fensterchef-core`'s [`fensterchef_core::config::bindings`]
//! can't do on its own. Grounded on the teacher's `init_keys`
//! (`x11::state_lifecycle::init_keys`): fetch the whole keyboard mapping
//! once and build both directions from it, rather than querying per key.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::ConnectionExt;
use x11rb::rust_connection::RustConnection;

use crate::error::Result;

pub(crate) struct Keymap {
    min_keycode: u8,
    keysyms_per_code: u8,
    keysyms: Vec<u32>,
}

impl Keymap {
    pub(crate) fn query(connection: &RustConnection) -> Result<Self> {
        let setup = connection.setup();
        let lo = setup.min_keycode;
        let hi = setup.max_keycode;
        let count = hi - lo + 1;
        let reply = connection.get_keyboard_mapping(lo, count)?.reply()?;
        Ok(Self {
            min_keycode: lo,
            keysyms_per_code: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        })
    }

    fn row(&self, keycode: u8) -> &[u32] {
        let Some(offset) = keycode.checked_sub(self.min_keycode) else {
            return &[];
        };
        let index = offset as usize * self.keysyms_per_code as usize;
        self.keysyms.get(index..index + self.keysyms_per_code as usize).unwrap_or(&[])
    }

    /// The first keycode whose mapping contains `keysym` — good enough
    /// for the unshifted bindings this configuration language produces
    /// (modifiers are expressed as `Modifiers`, not as a shifted keysym).
    #[must_use]
    pub(crate) fn keycode_for_keysym(&self, keysym: u32) -> Option<u8> {
        let total_codes = self.keysyms.len() / self.keysyms_per_code as usize;
        (0..total_codes)
            .map(|i| self.min_keycode + i as u8)
            .find(|&code| self.row(code).contains(&keysym))
    }

    #[must_use]
    pub(crate) fn keysym_for_keycode(&self, keycode: u8) -> Option<u32> {
        self.row(keycode).first().copied().filter(|sym| *sym != 0)
    }
}
