//! The process-wide stash stack, ported from `src/stash_frame.c`:
//! `stash_frame`/`stash_frame_later`, `pop_stashed_frame` (including the
//! "discard invalid entries in order" validation pass) and
//! `fill_void_with_stash`.

use crate::window::WindowRegistry;

use super::{Content, FrameId, FrameTree};

/// One detached subtree: either a leaf's single window reference, or an
/// inner node's two children, reparented onto this entry so the original
/// frame can become an empty leaf.
#[derive(Debug)]
pub(crate) enum Entry {
    Leaf(super::Content),
    Subtree {
        left: FrameId,
        right: FrameId,
        split: crate::geometry::SplitDirection,
        ratio: super::Ratio,
    },
}

/// LIFO of detached subtrees (§3.2). Entries reference nodes that remain
/// live in the owning [`FrameTree`]'s arena — the stash only remembers
/// *which* nodes, not a parentless clone of them — so popping grafts the
/// same `FrameId`s back rather than reallocating.
#[derive(Debug, Default)]
pub struct Stash {
    entries: Vec<Entry>,
}

impl Stash {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Detaches `frame`'s content onto the stash, leaving `frame` itself an
/// empty leaf. A frame that was already void is not worth stashing and is
/// left untouched (`stash_frame_later`'s early return).
pub fn stash(tree: &mut FrameTree, stash: &mut Stash, frame: FrameId) -> bool {
    if tree.is_empty_leaf(frame) {
        return false;
    }

    match tree.children(frame) {
        Some((left, right)) => {
            let split = tree.split_direction(frame).expect("inner frame has a split");
            let ratio = tree.ratio(frame).expect("inner frame has a ratio");
            stash.entries.push(Entry::Subtree { left, right, split, ratio });
            tree.replace_with_leaf(frame, Content::Empty);
        }
        None => {
            let window = tree.window(frame);
            stash.entries.push(Entry::Leaf(window.map_or(Content::Empty, Content::Window)));
            tree.set_window(frame, None).expect("frame is a leaf");
        }
    }
    true
}

/// Whether every window reachable under a stash entry is still registered,
/// still in tiling mode and still hidden — `is_window_valid` generalized to
/// a whole subtree, matching `validate_inner_windows`. An entry with zero
/// valid windows (including a leaf-with-no-window entry) is worthless.
fn entry_has_valid_window(entry: &Entry, tree: &FrameTree, windows: &WindowRegistry) -> bool {
    match entry {
        Entry::Leaf(Content::Window(w)) => windows.is_valid_hidden_tiling(*w),
        Entry::Leaf(Content::Empty) => false,
        Entry::Subtree { left, right, .. } => {
            tree.windows_in(*left)
                .into_iter()
                .chain(tree.windows_in(*right))
                .any(|w| windows.is_valid_hidden_tiling(w))
        }
    }
}

/// Pops the topmost entry with at least one still-valid window, discarding
/// (and freeing) every invalid entry above it along the way.
pub(crate) fn pop_stash(tree: &mut FrameTree, stash: &mut Stash, windows: &WindowRegistry) -> Option<Entry> {
    while let Some(entry) = stash.entries.pop() {
        if entry_has_valid_window(&entry, tree, windows) {
            return Some(entry);
        }
        if let Entry::Subtree { left, right, .. } = entry {
            free_subtree(tree, left);
            free_subtree(tree, right);
        }
    }
    None
}

fn free_subtree(tree: &mut FrameTree, frame: FrameId) {
    if let Some((left, right)) = tree.children(frame) {
        free_subtree(tree, left);
        free_subtree(tree, right);
    }
    tree.free_node(frame);
}

/// Grafts `entry` into `frame`, which must be an empty leaf.
fn graft(tree: &mut FrameTree, frame: FrameId, entry: Entry) {
    match entry {
        Entry::Leaf(content) => {
            if let Content::Window(w) = content {
                tree.set_window(frame, Some(w)).expect("frame is a leaf");
            }
        }
        Entry::Subtree { left, right, split, ratio } => {
            let rect = tree.rect(frame);
            let gaps = tree.gaps(frame);
            tree.replace_with_inner(frame, left, right, split, ratio);
            let _ = gaps;
            tree.set_parent(left, Some(frame));
            tree.set_parent(right, Some(frame));
            super::sizing::resize(tree, frame, rect, true);
        }
    }
}

/// Pops the stash and grafts the result into `frame` (which must be an
/// empty leaf), or does nothing if the stash has no valid entries left.
pub fn fill_void_with_stash(tree: &mut FrameTree, stash: &mut Stash, windows: &WindowRegistry, frame: FrameId) -> bool {
    match pop_stash(tree, stash, windows) {
        Some(entry) => {
            graft(tree, frame, entry);
            true
        }
        None => false,
    }
}
