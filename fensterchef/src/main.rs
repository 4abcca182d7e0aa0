#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_name_repetitions)]
// X11 uses inconsistent integer types fairly interchangeably.
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

mod config_source;
mod error;
mod events;
mod host;
mod reconcile;
mod spawn;
mod state;
mod synchronizer;
mod wm;
mod x11;

use crate::error::{Error, Result};
use crate::wm::run_wm;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    tracing::info!("starting fensterchef");

    if check_cfg() {
        return Ok(());
    }

    match run_wm() {
        Ok(()) => {
            tracing::info!("exiting");
            Ok(())
        }
        Err(Error::BecomeWm) => {
            tracing::error!("could not become window manager");
            Err(Error::BecomeWm)
        }
        Err(e) => {
            tracing::error!(error = %e, "fatal error");
            Err(e)
        }
    }
}

/// `--check-cfg`: parse the user's configuration file and report whether
/// it's valid, without connecting to a display (§7 scenario family).
fn check_cfg() -> bool {
    let mut args = std::env::args();
    args.next();
    let Some(arg) = args.next() else {
        return false;
    };
    if arg != "--check-cfg" {
        println!("The only recognized argument is --check-cfg.");
        return true;
    }

    let path = wm::config_path();
    let loader = config_source::FileSourceLoader;
    let keysyms = config_source::X11KeysymResolver;
    match std::fs::read_to_string(&path) {
        Ok(source) => match fensterchef_core::config::parser::parse(&source, &path, &loader, &keysyms) {
            Ok(_) => println!("Configuration valid!"),
            Err(errors) => {
                println!("Invalid configuration:\n{errors}");
            }
        },
        Err(e) => println!("Could not read {path}: {e}"),
    }
    true
}
