use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Errors that can end the event loop. Wraps [`fensterchef_core::Error`]
/// the way `pgwm::error::Error` wraps `pgwm_core::error::Error`; the
/// variants below it are specific to owning the X11 connection and the
/// process itself.
#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Core(#[from] fensterchef_core::Error),
    #[error(transparent)]
    X11Connect(#[from] ConnectError),
    #[error(transparent)]
    X11Connection(#[from] ConnectionError),
    #[error(transparent)]
    X11Reply(#[from] ReplyError),
    #[error(transparent)]
    X11IdCreation(#[from] ReplyOrIdError),
    #[error("could not become window manager, access denied - is another one already running?")]
    BecomeWm,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    NixErrno(#[from] nix::errno::Errno),
    #[error(transparent)]
    ConvertToUtf8(#[from] std::string::FromUtf8Error),
    /// `Action::Reload` (§4.4): tear the connection down and reconnect with
    /// a freshly reloaded configuration, without exiting the process.
    #[error("reload requested")]
    Reload,
    /// `Action::Quit`.
    #[error("shutdown requested")]
    GracefulShutdown,
}
