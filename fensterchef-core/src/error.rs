use crate::config::parser::error::ParseErrors;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the data model and the configuration language.
///
/// X11 transport errors live in `fensterchef::error::Error`, which wraps
/// this enum the way `pgwm::error::Error` wraps `pgwm_core::error::Error`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("frame {0:?} has no parent and cannot be removed, only cleared")]
    RemoveRoot(crate::frame::FrameId),
    #[error("frame {0:?} is not a leaf")]
    NotALeaf(crate::frame::FrameId),
    #[error("frame {0:?} is not an inner node")]
    NotInner(crate::frame::FrameId),
    #[error("monitor {0:?} not found")]
    UnknownMonitor(crate::monitor::MonitorId),
    #[error("window {0} is not registered")]
    UnknownWindow(u32),
    #[error("window {0} is already registered")]
    AlreadyRegistered(u32),
    #[error("no frame reference for window {0}")]
    WindowNotTiled(u32),
    #[error("bytecode evaluator stack exhausted")]
    StackExhausted,
    #[error("configuration has unresolved errors")]
    Configuration(#[from] ParseErrors),
    #[error("association pattern {0:?} is not a valid glob")]
    InvalidGlob(String),
}
