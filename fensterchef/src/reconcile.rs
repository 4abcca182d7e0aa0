//! Reconciling a fresh RandR query against the live [`MonitorSet`] (§4.3
//! step by step): same-name monitors keep their subtree, surviving
//! subtrees move to newly-free monitors in order, and anything left over
//! gets stashed rather than dropped. Grounded on
//! `original_source/src/monitor.c`'s merge, expressed over
//! `fensterchef-core`'s arena/stash primitives rather than translated.

use fensterchef_core::frame::stash::Stash;
use fensterchef_core::frame::FrameTree;
use fensterchef_core::geometry::Rect;
use fensterchef_core::monitor::MonitorSet;

use crate::x11::monitors::MonitorInfo;

/// Rebuilds `monitors` from `queried`, carrying over root frames by name
/// and stashing whatever doesn't find a new home.
pub(crate) fn reconcile(monitors: &mut MonitorSet, tree: &mut FrameTree, stash: &mut Stash, queried: &[MonitorInfo]) {
    let mut carried: Vec<(MonitorInfo, fensterchef_core::frame::FrameId)> = Vec::new();
    let mut leftover_roots = Vec::new();

    for old in monitors.iter() {
        if let Some(info) = queried.iter().find(|q| q.name == old.name) {
            carried.push((info.clone(), old.root_frame));
        } else {
            leftover_roots.push(old.root_frame);
        }
    }

    let mut unclaimed: Vec<&MonitorInfo> = queried.iter().filter(|q| !carried.iter().any(|(info, _)| info.name == q.name)).collect();

    let mut reassigned = Vec::new();
    for root in leftover_roots {
        if let Some(info) = unclaimed.pop() {
            reassigned.push((info.clone(), root));
        } else {
            stash::stash_root(tree, stash, root);
        }
    }

    for info in unclaimed {
        reassigned.push((info.clone(), tree.create_root(info.rect, fensterchef_core::frame::Gaps::default())));
    }

    let ids: Vec<fensterchef_core::monitor::MonitorId> = monitors.iter().map(|m| m.id).collect();
    for id in ids {
        monitors.remove(id);
    }

    for (info, root) in carried.into_iter().chain(reassigned) {
        fensterchef_core::frame::sizing::resize(tree, root, info.rect, false);
        monitors.insert(info.name, info.rect, info.primary, root);
    }
}

/// Thin indirection so this module reads `stash::stash_root` the way the
/// rest of the binary crate reads `fensterchef_core::frame::stash::stash`,
/// without importing the free function name twice under two spellings.
mod stash {
    use fensterchef_core::frame::stash::{stash, Stash};
    use fensterchef_core::frame::{FrameId, FrameTree};

    pub(super) fn stash_root(tree: &mut FrameTree, s: &mut Stash, root: FrameId) {
        stash(tree, s, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fensterchef_core::frame::Gaps;

    fn info(name: &str, x: i32) -> MonitorInfo {
        MonitorInfo {
            name: name.to_string(),
            rect: Rect::new(x, 0, 800, 600),
            primary: x == 0,
        }
    }

    #[test]
    fn same_name_monitor_keeps_its_root_frame() {
        let mut tree = FrameTree::new();
        let mut monitors = MonitorSet::new();
        let mut stash = Stash::new();
        let root = tree.create_root(Rect::new(0, 0, 800, 600), Gaps::default());
        monitors.insert("eDP-1".to_string(), Rect::new(0, 0, 800, 600), true, root);

        reconcile(&mut monitors, &mut tree, &mut stash, &[info("eDP-1", 0)]);

        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors.iter().next().unwrap().root_frame, root);
    }

    #[test]
    fn disappearing_monitor_gets_stashed_not_dropped() {
        let mut tree = FrameTree::new();
        let mut monitors = MonitorSet::new();
        let mut stash = Stash::new();
        let root = tree.create_root(Rect::new(0, 0, 800, 600), Gaps::default());
        monitors.insert("HDMI-1".to_string(), Rect::new(0, 0, 800, 600), true, root);

        reconcile(&mut monitors, &mut tree, &mut stash, &[info("eDP-1", 0)]);

        assert_eq!(monitors.len(), 1);
        assert!(!stash.is_empty());
    }
}
