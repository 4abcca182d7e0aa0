//! The frame tree: a binary space partition of a monitor's usable area.
//!
//! Grounded on `original_source/src/frame.c` / `src/frame.h` for the leaf
//! vs. inner split and the ratio/gap invariants of `spec.md` §3.1, and on
//! the teacher's arena-over-`Vec` style for owned collections (e.g.
//! `pgwm_core::state::Workspaces` holding a flat `Vec<Workspace>` rather
//! than a pointer graph). `spec.md` §9 suggests one arena per monitor; we
//! use a single process-wide arena shared by every monitor and the stash
//! stack instead, so `move`-between-monitors and stashing never need to
//! re-parent nodes across arena boundaries. Recorded in `DESIGN.md`.

pub mod moving;
pub mod sizing;
pub mod splitting;
pub mod stash;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::geometry::{Direction, Quad, Rect, Side, SplitDirection};
use crate::window::WindowId;

/// Minimum width/height a leaf frame may be shrunk to (§3.1 invariant).
pub const MIN_FRAME_SIZE: u32 = 16;

/// Index into a [`FrameTree`]'s arena. Stable for the lifetime of the node;
/// reused by later allocations once the node is freed, so a `FrameId` kept
/// across a `remove`/`split` of an unrelated frame can silently refer to a
/// different node. Per §4.1's failure model this is a programmer error to
/// guard against by discipline, not by runtime generation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

/// Split ratio: the *right* (or *down*, for a vertical split) child's share
/// of the parent's width (height). `denominator == 0` means an implicit
/// 50/50 split (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: u32,
    pub denominator: u32,
}

impl Ratio {
    pub const HALF: Ratio = Ratio {
        numerator: 0,
        denominator: 0,
    };

    #[must_use]
    pub fn new(numerator: u32, denominator: u32) -> Self {
        debug_assert!(denominator == 0 || numerator <= denominator);
        Self {
            numerator,
            denominator,
        }
    }

    /// The right/bottom child's share of the split axis, as a fraction in
    /// `[0, 1]`.
    #[must_use]
    pub fn share(&self) -> f64 {
        if self.denominator == 0 {
            0.5
        } else {
            f64::from(self.numerator) / f64::from(self.denominator)
        }
    }

    #[must_use]
    pub fn from_share(share: f64) -> Self {
        let denominator = 1_000_000u32;
        let numerator = (share.clamp(0.0, 1.0) * f64::from(denominator)).round() as u32;
        Ratio::new(numerator, denominator)
    }
}

/// Per-edge inner/outer gaps a frame inherits from configuration (§6
/// `[gaps]`). Stored per-frame rather than looked up globally so stashed
/// subtrees keep the gaps they were created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gaps {
    pub inner: Quad,
    pub outer: Quad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Content {
    Empty,
    Window(WindowId),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct InnerData {
    pub left: FrameId,
    pub right: FrameId,
    pub split: SplitDirection,
    pub ratio: Ratio,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Kind {
    Leaf(Content),
    Inner(InnerData),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub parent: Option<FrameId>,
    pub rect: Rect,
    pub name: Option<u32>,
    pub gaps: Gaps,
    pub kind: Kind,
}

/// The arena backing every frame tree (one logical tree per monitor root,
/// plus whatever the stash stack currently holds detached).
#[derive(Debug, Default)]
pub struct FrameTree {
    nodes: Vec<Option<Node>>,
    free: Vec<FrameId>,
    next_name: u32,
}

impl FrameTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh leaf frame with the given geometry and no content.
    /// This is `create_root` (§4.1) when called with no parent; `split`
    /// also allocates through this for the sibling leaf.
    pub fn create_root(&mut self, rect: Rect, gaps: Gaps) -> FrameId {
        self.alloc(Node {
            parent: None,
            rect,
            name: None,
            gaps,
            kind: Kind::Leaf(Content::Empty),
        })
    }

    fn alloc(&mut self, node: Node) -> FrameId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0 as usize] = Some(node);
            id
        } else {
            let id = FrameId(self.nodes.len() as u32);
            self.nodes.push(Some(node));
            id
        }
    }

    fn free(&mut self, id: FrameId) {
        self.nodes[id.0 as usize] = None;
        self.free.push(id);
    }

    fn node(&self, id: FrameId) -> &Node {
        self.nodes[id.0 as usize]
            .as_ref()
            .expect("FrameId used after the frame was freed")
    }

    fn node_mut(&mut self, id: FrameId) -> &mut Node {
        self.nodes[id.0 as usize]
            .as_mut()
            .expect("FrameId used after the frame was freed")
    }

    #[must_use]
    pub fn rect(&self, id: FrameId) -> Rect {
        self.node(id).rect
    }

    #[must_use]
    pub fn gaps(&self, id: FrameId) -> Gaps {
        self.node(id).gaps
    }

    #[must_use]
    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn name(&self, id: FrameId) -> Option<u32> {
        self.node(id).name
    }

    pub fn set_name(&mut self, id: FrameId, name: Option<u32>) {
        self.node_mut(id).name = name;
    }

    pub fn set_gaps(&mut self, id: FrameId, gaps: Gaps) {
        self.node_mut(id).gaps = gaps;
    }

    #[must_use]
    pub fn is_leaf(&self, id: FrameId) -> bool {
        matches!(self.node(id).kind, Kind::Leaf(_))
    }

    #[must_use]
    pub fn is_empty_leaf(&self, id: FrameId) -> bool {
        matches!(self.node(id).kind, Kind::Leaf(Content::Empty))
    }

    /// The window referenced by this leaf, if any. `None` for inner frames.
    #[must_use]
    pub fn window(&self, id: FrameId) -> Option<WindowId> {
        match self.node(id).kind {
            Kind::Leaf(Content::Window(w)) => Some(w),
            _ => None,
        }
    }

    pub fn set_window(&mut self, id: FrameId, window: Option<WindowId>) -> Result<()> {
        match &mut self.node_mut(id).kind {
            Kind::Leaf(content) => {
                *content = match window {
                    Some(w) => Content::Window(w),
                    None => Content::Empty,
                };
                Ok(())
            }
            Kind::Inner(_) => Err(Error::NotALeaf(id)),
        }
    }

    #[must_use]
    pub fn children(&self, id: FrameId) -> Option<(FrameId, FrameId)> {
        match self.node(id).kind {
            Kind::Inner(InnerData { left, right, .. }) => Some((left, right)),
            Kind::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn split_direction(&self, id: FrameId) -> Option<SplitDirection> {
        match self.node(id).kind {
            Kind::Inner(InnerData { split, .. }) => Some(split),
            Kind::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn ratio(&self, id: FrameId) -> Option<Ratio> {
        match self.node(id).kind {
            Kind::Inner(InnerData { ratio, .. }) => Some(ratio),
            Kind::Leaf(_) => None,
        }
    }

    pub fn set_ratio(&mut self, id: FrameId, ratio: Ratio) -> Result<()> {
        match &mut self.node_mut(id).kind {
            Kind::Inner(inner) => {
                inner.ratio = ratio;
                Ok(())
            }
            Kind::Leaf(_) => Err(Error::NotInner(id)),
        }
    }

    /// The sibling of `id`, or `None` if `id` is a root.
    #[must_use]
    pub fn sibling(&self, id: FrameId) -> Option<FrameId> {
        let parent = self.parent(id)?;
        let (left, right) = self.children(parent).expect("parent must be inner");
        Some(if left == id { right } else { left })
    }

    /// Whether `id` is the left/right (or up/down) child of its parent.
    #[must_use]
    pub fn side_of_parent(&self, id: FrameId) -> Option<Side> {
        let parent = self.parent(id)?;
        let (left, _right) = self.children(parent).expect("parent must be inner");
        Some(if left == id { Side::Left } else { Side::Right })
    }

    /// Allocates and returns the next unused small integer name usable by
    /// actions like "focus frame 3" (§3.1). Monotonic; never reused even
    /// after a named frame is removed, matching the window numbering
    /// discipline being the one place names *are* reused (§3.3) while frame
    /// names (a user-assigned convenience, not an identity) are not.
    pub fn next_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    /// Depth-first leaves of the subtree rooted at `id`, left before right.
    pub fn leaves(&self, id: FrameId) -> Vec<FrameId> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out);
        out
    }

    fn collect_leaves(&self, id: FrameId, out: &mut Vec<FrameId>) {
        match self.children(id) {
            Some((left, right)) => {
                self.collect_leaves(left, out);
                self.collect_leaves(right, out);
            }
            None => out.push(id),
        }
    }

    /// All windows referenced anywhere in the subtree rooted at `id`.
    #[must_use]
    pub fn windows_in(&self, id: FrameId) -> Vec<WindowId> {
        self.leaves(id)
            .into_iter()
            .filter_map(|leaf| self.window(leaf))
            .collect()
    }

    /// `get_leaf_at` (§4.1): the leaf whose rectangle contains `(x, y)`.
    #[must_use]
    pub fn leaf_at(&self, root: FrameId, x: i32, y: i32) -> Option<FrameId> {
        let mut cur = root;
        loop {
            match self.children(cur) {
                None => return self.rect(cur).contains(x, y).then_some(cur),
                Some((left, right)) => {
                    cur = if self.rect(left).contains(x, y) {
                        left
                    } else if self.rect(right).contains(x, y) {
                        right
                    } else {
                        return None;
                    };
                }
            }
        }
    }

    /// Sums leaf rectangles (gaps included) under `root`; used by the
    /// "frame geometry partitions the root" testable property (§8).
    #[must_use]
    pub fn total_leaf_area(&self, root: FrameId) -> u64 {
        self.leaves(root).iter().map(|l| self.rect(*l).area()).sum()
    }

    /// Walks every frame in the tree rooted at `root`, depth-first
    /// pre-order, calling `f` with each id. Used by the synchronizer to
    /// find ancestor chains and by tests asserting structural invariants.
    pub fn walk(&self, root: FrameId, f: &mut impl FnMut(FrameId)) {
        f(root);
        if let Some((left, right)) = self.children(root) {
            self.walk(left, f);
            self.walk(right, f);
        }
    }

    /// Reverse lookup: the frame (anywhere in the whole arena, including
    /// detached stash subtrees) currently referencing `window`, if any.
    #[must_use]
    pub fn find_window(&self, window: WindowId) -> Option<FrameId> {
        self.nodes.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref().and_then(|n| match n.kind {
                Kind::Leaf(Content::Window(w)) if w == window => Some(FrameId(i as u32)),
                _ => None,
            })
        })
    }

    pub(crate) fn alloc_leaf(&mut self, rect: Rect, gaps: Gaps, parent: Option<FrameId>) -> FrameId {
        self.alloc(Node {
            parent,
            rect,
            name: None,
            gaps,
            kind: Kind::Leaf(Content::Empty),
        })
    }

    pub(crate) fn alloc_inner(
        &mut self,
        rect: Rect,
        gaps: Gaps,
        parent: Option<FrameId>,
        left: FrameId,
        right: FrameId,
        split: SplitDirection,
        ratio: Ratio,
    ) -> FrameId {
        self.alloc(Node {
            parent,
            rect,
            name: None,
            gaps,
            kind: Kind::Inner(InnerData {
                left,
                right,
                split,
                ratio,
            }),
        })
    }

    pub(crate) fn set_parent(&mut self, id: FrameId, parent: Option<FrameId>) {
        self.node_mut(id).parent = parent;
    }

    pub(crate) fn set_rect(&mut self, id: FrameId, rect: Rect) {
        self.node_mut(id).rect = rect;
    }

    pub(crate) fn set_children(&mut self, id: FrameId, left: FrameId, right: FrameId) {
        match &mut self.node_mut(id).kind {
            Kind::Inner(inner) => {
                inner.left = left;
                inner.right = right;
            }
            Kind::Leaf(_) => unreachable!("set_children on a leaf"),
        }
    }

    /// Converts a leaf into an inner node in place (used by `split`, case
    /// S2) or an inner node into a leaf holding `content` (used by
    /// `remove`, when the surviving sibling becomes the parent's new
    /// content in-place).
    pub(crate) fn replace_with_inner(
        &mut self,
        id: FrameId,
        left: FrameId,
        right: FrameId,
        split: SplitDirection,
        ratio: Ratio,
    ) {
        let node = self.node_mut(id);
        node.kind = Kind::Inner(InnerData {
            left,
            right,
            split,
            ratio,
        });
    }

    pub(crate) fn replace_with_leaf(&mut self, id: FrameId, content: Content) {
        self.node_mut(id).kind = Kind::Leaf(content);
    }

    pub(crate) fn free_node(&mut self, id: FrameId) {
        self.free(id);
    }
}

/// Per-monitor-name lookup of root frames, used when reconciling monitor
/// sets (§4.3) and restoring stash entries into the correct monitor.
pub type RootsByMonitor = HashMap<crate::monitor::MonitorId, FrameId>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SplitDirection;

    fn tree_with_root() -> (FrameTree, FrameId) {
        let mut tree = FrameTree::new();
        let root = tree.create_root(Rect::new(0, 0, 1000, 800), Gaps::default());
        (tree, root)
    }

    #[test]
    fn fresh_root_is_an_empty_leaf() {
        let (tree, root) = tree_with_root();
        assert!(tree.is_leaf(root));
        assert!(tree.is_empty_leaf(root));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn leaf_at_point_finds_nested_leaf() {
        let (mut tree, root) = tree_with_root();
        let new_leaf = tree.alloc_leaf(Rect::default(), Gaps::default(), None);
        crate::frame::splitting::split(
            &mut tree,
            root,
            Some(new_leaf),
            Side::Right,
            SplitDirection::Horizontal,
            false,
            false,
        )
        .unwrap();
        let found = tree.leaf_at(root, 900, 10).unwrap();
        assert_eq!(tree.window(found), None);
        assert!(tree.rect(found).contains(900, 10));
    }

    #[test]
    fn split_reports_the_leaf_focus_new_leaf_asks_for() {
        let (mut tree, root) = tree_with_root();
        let (inner, focused) = crate::frame::splitting::split(
            &mut tree,
            root,
            None,
            Side::Right,
            SplitDirection::Horizontal,
            false,
            true,
        )
        .unwrap();
        let (left, right) = tree.children(inner).unwrap();
        assert_eq!(focused, right);
        assert_ne!(focused, left);
    }
}
