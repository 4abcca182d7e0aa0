//! The monitor set (§3.4/§4.3): named rectangles with per-monitor root
//! frames, reconciled by name across reconfiguration. Grounded on
//! `original_source/src/monitor.c`'s monitor-list merge (read through
//! `frame_moving.c`'s `get_monitor_containing_frame`/`get_left_monitor`
//! etc. call sites) and on the teacher's `Vec` + index style.

use crate::frame::FrameId;
use crate::geometry::{Direction, Rect, Strut};

/// Stable small-integer identity for a monitor slot, independent of
/// position in [`MonitorSet`]'s ordered list (which reconciliation
/// reshuffles). Reused across a reconfiguration only when the new query
/// carries the same monitor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub u32);

#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    pub rect: Rect,
    pub primary: bool,
    pub strut: Strut,
    pub root_frame: FrameId,
}

impl Monitor {
    /// The monitor rectangle after subtracting its accumulated strut —
    /// what root frames are actually resized to (§4.3).
    #[must_use]
    pub fn usable_rect(&self) -> Rect {
        self.rect.shrunk_by(&self.strut)
    }
}

/// The ordered set of monitors, per §3.4. Order matters only for
/// `_NET_DESKTOP_NAMES`-style enumeration and as a tiebreak for adjacency;
/// identity and reconciliation go by name.
#[derive(Debug, Default)]
pub struct MonitorSet {
    monitors: Vec<Monitor>,
    next_id: u32,
}

impl MonitorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: MonitorId) -> Option<&mut Monitor> {
        self.monitors.iter_mut().find(|m| m.id == id)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.name == name)
    }

    fn fresh_id(&mut self) -> MonitorId {
        self.next_id += 1;
        MonitorId(self.next_id)
    }

    /// Inserts a monitor freshly reconciled (i.e. whose `root_frame` the
    /// caller already created or carried over) and returns its id.
    pub fn insert(&mut self, name: String, rect: Rect, primary: bool, root_frame: FrameId) -> MonitorId {
        let id = self.fresh_id();
        self.monitors.push(Monitor {
            id,
            name,
            rect,
            primary,
            strut: Strut::default(),
            root_frame,
        });
        id
    }

    pub fn remove(&mut self, id: MonitorId) -> Option<Monitor> {
        let pos = self.monitors.iter().position(|m| m.id == id)?;
        Some(self.monitors.remove(pos))
    }

    /// The monitor whose rectangle contains `rect`'s center, falling back
    /// to the one with the largest overlap — used by `move`'s "already at
    /// an outer edge" case to find the frame's home monitor.
    #[must_use]
    pub fn monitor_containing(&self, rect: Rect) -> Option<MonitorId> {
        let (cx, cy) = rect.center();
        self.monitors
            .iter()
            .find(|m| m.rect.contains(cx, cy))
            .or_else(|| {
                self.monitors
                    .iter()
                    .max_by_key(|m| m.rect.intersects(&rect).then(|| overlap_area(m.rect, rect)).unwrap_or(0))
            })
            .map(|m| m.id)
    }

    /// The monitor adjacent to `from` in `direction`: among monitors whose
    /// rectangle is strictly on that side, the one whose near edge is
    /// closest to `from`'s.
    #[must_use]
    pub fn adjacent(&self, from: MonitorId, direction: Direction) -> Option<&Monitor> {
        let origin = self.get(from)?.rect;
        self.monitors
            .iter()
            .filter(|m| m.id != from)
            .filter(|m| match direction {
                Direction::Left => m.rect.right() <= origin.x,
                Direction::Right => m.rect.x >= origin.right(),
                Direction::Up => m.rect.bottom() <= origin.y,
                Direction::Down => m.rect.y >= origin.bottom(),
            })
            .min_by_key(|m| match direction {
                Direction::Left => origin.x - m.rect.right(),
                Direction::Right => m.rect.x - origin.right(),
                Direction::Up => origin.y - m.rect.bottom(),
                Direction::Down => m.rect.y - origin.bottom(),
            })
    }

    /// Recomputes every monitor's strut by summing the struts of the
    /// visible windows whose center lies on it, per §4.3.
    pub fn recompute_struts(&mut self, docks: impl Iterator<Item = (Rect, Strut)>) {
        for monitor in &mut self.monitors {
            monitor.strut = Strut::default();
        }
        for (rect, strut) in docks {
            let (cx, cy) = rect.center();
            if let Some(monitor) = self.monitors.iter_mut().find(|m| m.rect.contains(cx, cy)) {
                monitor.strut = monitor.strut.union(&strut);
            }
        }
    }
}

fn overlap_area(a: Rect, b: Rect) -> u64 {
    let left = a.x.max(b.x);
    let right = a.right().min(b.right());
    let top = a.y.max(b.y);
    let bottom = a.bottom().min(b.bottom());
    if right <= left || bottom <= top {
        0
    } else {
        u64::from((right - left) as u32) * u64::from((bottom - top) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameTree;

    fn set_with_two_monitors() -> (MonitorSet, MonitorId, MonitorId) {
        let mut tree = FrameTree::new();
        let mut set = MonitorSet::new();
        let left_root = tree.create_root(Rect::new(0, 0, 800, 600), Default::default());
        let right_root = tree.create_root(Rect::new(800, 0, 800, 600), Default::default());
        let left = set.insert("left".into(), Rect::new(0, 0, 800, 600), true, left_root);
        let right = set.insert("right".into(), Rect::new(800, 0, 800, 600), false, right_root);
        (set, left, right)
    }

    #[test]
    fn adjacent_finds_the_monitor_to_the_right() {
        let (set, left, right) = set_with_two_monitors();
        let found = set.adjacent(left, Direction::Right).unwrap();
        assert_eq!(found.id, right);
        assert!(set.adjacent(right, Direction::Right).is_none());
    }

    #[test]
    fn monitor_containing_finds_by_center() {
        let (set, left, _right) = set_with_two_monitors();
        let found = set.monitor_containing(Rect::new(100, 100, 50, 50)).unwrap();
        assert_eq!(found, left);
    }
}
