//! The configuration model (§4.5): a flat struct of scalar settings plus
//! the binding and association tables, built up by the parser (`parser`)
//! and consulted by the rest of the crate. Grounded on
//! `original_source/include/bits/configuration_structure.h`'s per-label
//! sub-structs, translated from C bitfields/arrays into plain Rust types.

pub mod association;
pub mod bindings;
pub mod parser;

use crate::expr::Bytecode;
use crate::geometry::Quad;

pub use association::{Association, Glob};
pub use bindings::{ButtonBinding, ButtonFlags, KeyBinding, KeyFlags, Modifiers};

#[derive(Debug, Clone, Copy)]
pub struct GeneralSettings {
    pub overlap_percentage: i32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            overlap_percentage: 50,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TilingSettings {
    pub auto_split: bool,
    pub auto_equalize: bool,
    pub auto_fill_void: bool,
    pub auto_remove: bool,
    pub auto_remove_void: bool,
}

impl Default for TilingSettings {
    fn default() -> Self {
        Self {
            auto_split: true,
            auto_equalize: true,
            auto_fill_void: true,
            auto_remove: true,
            auto_remove_void: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FontSettings {
    pub name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct BorderSettings {
    pub size: i32,
    pub color: u32,
    pub active_color: u32,
    pub focus_color: u32,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            size: 1,
            color: 0x555555,
            active_color: 0x8888aa,
            focus_color: 0xaaaaee,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GapsSettings {
    pub inner: Quad,
    pub outer: Quad,
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationSettings {
    pub duration: i32,
    pub padding: i32,
    pub border_size: i32,
    pub border_color: u32,
    pub foreground: u32,
    pub background: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            duration: 2,
            padding: 4,
            border_size: 1,
            border_color: 0x555555,
            foreground: 0xffffff,
            background: 0x222222,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MouseSettings {
    pub resize_tolerance: i32,
    pub modifiers: Modifiers,
    pub ignore_modifiers: Modifiers,
    pub buttons: Vec<ButtonBinding>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardSettings {
    pub modifiers: Modifiers,
    pub ignore_modifiers: Modifiers,
    pub keys: Vec<KeyBinding>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentSettings {
    pub first_window_number: i32,
    pub associations: Vec<Association>,
}

/// The full configuration, as held by the binary crate for the lifetime of
/// one loaded config file (§4.5).
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub startup: Bytecode,
    pub general: GeneralSettings,
    pub assignment: AssignmentSettings,
    pub tiling: TilingSettings,
    pub font: FontSettings,
    pub border: BorderSettings,
    pub gaps: GapsSettings,
    pub notification: NotificationSettings,
    pub mouse: MouseSettings,
    pub keyboard: KeyboardSettings,
}
