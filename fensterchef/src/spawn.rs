//! Process spawning for `Action::Run` (§4.4). Grounded on the teacher's
//! `manager::spawn::spawn`: detach stdio so a launched client doesn't
//! inherit the WM's terminal, and don't wait for it.

use std::process::Stdio;

use crate::error::Result;

pub(crate) fn spawn(command: &str) -> Result<()> {
    let mut parts = command.split_whitespace();
    let Some(bin) = parts.next() else {
        return Ok(());
    };
    std::process::Command::new(bin)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    tracing::debug!(command, "spawned");
    Ok(())
}
