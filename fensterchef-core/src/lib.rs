#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_name_repetitions)]

//! Data model and pure logic for the fensterchef tiling window manager:
//! the frame tree, the window registry, the monitor set, the bytecode
//! expression engine, the configuration language, and the logic half of
//! the per-cycle synchronizer. No X11 connection lives in this crate;
//! everything here is driven by data the binary crate (`fensterchef`)
//! fetches from the display and hands in.

pub mod atoms;
pub mod config;
pub mod error;
pub mod expr;
pub mod frame;
pub mod geometry;
pub mod monitor;
pub mod sync;
pub mod variables;
pub mod window;

pub use error::{Error, Result};
