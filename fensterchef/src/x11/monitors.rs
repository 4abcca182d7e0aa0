//! Querying monitor geometry off the display (§4.3: "queried from the
//! server when the multi-head extension is present, or synthesized as a
//! single virtual monitor"). The teacher never had to do this (`pgwm`
//! only ever ran on a single screen), so this is grounded on the other
//! pack examples' RandR usage rather than on the teacher itself, kept in
//! the teacher's thin-wrapper-over-`ConnectionExt` style.

use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::Screen;
use x11rb::rust_connection::RustConnection;

use fensterchef_core::geometry::Rect;

use crate::error::Result;

#[derive(Debug, Clone)]
pub(crate) struct MonitorInfo {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) primary: bool,
}

/// Queries RandR's monitor list; falls back to one virtual monitor the
/// size of the root window if RandR is unavailable or reports nothing
/// (nested/headless X servers commonly do neither).
pub(crate) fn query_monitors(connection: &RustConnection, screen: &Screen) -> Result<Vec<MonitorInfo>> {
    match connection.randr_get_monitors(screen.root, true) {
        Ok(cookie) => match cookie.reply() {
            Ok(reply) if !reply.monitors.is_empty() => {
                let mut monitors = Vec::with_capacity(reply.monitors.len());
                for monitor in reply.monitors {
                    let name = atom_name(connection, monitor.name).unwrap_or_else(|| format!("monitor-{}", monitor.name));
                    monitors.push(MonitorInfo {
                        name,
                        rect: Rect::new(
                            i32::from(monitor.x),
                            i32::from(monitor.y),
                            u32::from(monitor.width),
                            u32::from(monitor.height),
                        ),
                        primary: monitor.primary,
                    });
                }
                Ok(monitors)
            }
            _ => Ok(vec![synthesize(screen)]),
        },
        Err(_) => Ok(vec![synthesize(screen)]),
    }
}

fn synthesize(screen: &Screen) -> MonitorInfo {
    MonitorInfo {
        name: "virtual-1".to_string(),
        rect: Rect::new(0, 0, u32::from(screen.width_in_pixels), u32::from(screen.height_in_pixels)),
        primary: true,
    }
}

fn atom_name(connection: &RustConnection, atom: u32) -> Option<String> {
    use x11rb::protocol::xproto::ConnectionExt as _;
    let reply = connection.get_atom_name(atom).ok()?.reply().ok()?;
    String::from_utf8(reply.name).ok()
}
