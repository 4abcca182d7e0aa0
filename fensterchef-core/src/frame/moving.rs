//! Frame navigation and `move`/`exchange`, ported from
//! `src/frame_moving.c`: `get_left_or_above_frame`/`get_right_or_below_frame`
//! and their four directional wrappers, the four leaf-descent helpers,
//! `do_resplit`, `move_frame_up_or_left`/`move_frame_down_or_right`, and
//! `exchange_frames`.

use crate::geometry::{Direction, Side, SplitDirection};
use crate::monitor::MonitorSet;
use crate::window::WindowRegistry;

use super::stash::{self, Stash};
use super::splitting;
use super::{Content, FrameId, FrameTree};

/// The frame immediately to the left of `frame` in the tiling layout:
/// walk up while `frame` is the left child of a horizontally-split parent,
/// then either step onto that differently-split parent, or descend into the
/// left sibling's rightmost matching-direction leaf. `None` at an outer
/// edge.
fn get_left_or_above(tree: &FrameTree, frame: FrameId, direction: SplitDirection) -> Option<FrameId> {
    let mut frame = frame;
    loop {
        let parent = tree.parent(frame)?;
        if tree.split_direction(parent) != Some(direction) {
            return Some(parent);
        }
        let (left, _right) = tree.children(parent).expect("parent is inner");
        if left == frame {
            frame = parent;
            continue;
        }
        let mut cur = left;
        while let Some((cur_left, cur_right)) = tree.children(cur) {
            if tree.split_direction(cur) != Some(direction) {
                break;
            }
            cur = cur_right;
            let _ = cur_left;
        }
        return Some(cur);
    }
}

fn get_right_or_below(tree: &FrameTree, frame: FrameId, direction: SplitDirection) -> Option<FrameId> {
    let mut frame = frame;
    loop {
        let parent = tree.parent(frame)?;
        if tree.split_direction(parent) != Some(direction) {
            return Some(parent);
        }
        let (_left, right) = tree.children(parent).expect("parent is inner");
        if right == frame {
            frame = parent;
            continue;
        }
        let mut cur = right;
        while let Some((cur_left, _cur_right)) = tree.children(cur) {
            if tree.split_direction(cur) != Some(direction) {
                break;
            }
            cur = cur_left;
        }
        return Some(cur);
    }
}

pub fn get_left_frame(tree: &FrameTree, frame: FrameId) -> Option<FrameId> {
    get_left_or_above(tree, frame, SplitDirection::Horizontal)
}

pub fn get_above_frame(tree: &FrameTree, frame: FrameId) -> Option<FrameId> {
    get_left_or_above(tree, frame, SplitDirection::Vertical)
}

pub fn get_right_frame(tree: &FrameTree, frame: FrameId) -> Option<FrameId> {
    get_right_or_below(tree, frame, SplitDirection::Horizontal)
}

pub fn get_below_frame(tree: &FrameTree, frame: FrameId) -> Option<FrameId> {
    get_right_or_below(tree, frame, SplitDirection::Vertical)
}

/// `get_parent_in_direction` (§4.1): the nearest ancestor (possibly `frame`
/// itself walked up through) reachable by moving in `direction`.
#[must_use]
pub fn get_parent_in_direction(tree: &FrameTree, frame: FrameId, direction: Direction) -> Option<FrameId> {
    match direction {
        Direction::Left => get_left_frame(tree, frame),
        Direction::Right => get_right_frame(tree, frame),
        Direction::Up => get_above_frame(tree, frame),
        Direction::Down => get_below_frame(tree, frame),
    }
}

/// Descends from `frame` towards its rightmost (for a horizontal move) or
/// bottommost (for a vertical move) leaf, the counterpart frame adjacent to
/// the slot `original` vacated: at a node split along `movement_axis`,
/// always takes the further child; at a node split the other way, picks
/// whichever child's near edge already reaches `pivot` (the original
/// frame's center coordinate on the orthogonal axis). Used for cases 2 and
/// 5 regardless of which way the move is headed — `get_most_right_leaf_frame`
/// / `get_bottom_leaf_frame` are the only descent variants the original
/// actually calls from `move_frame_up_or_left`/`move_frame_down_or_right`.
fn descend_to_closest_leaf(tree: &FrameTree, frame: FrameId, pivot: i32, movement_axis: SplitDirection) -> FrameId {
    let mut cur = frame;
    loop {
        let Some((left, right)) = tree.children(cur) else {
            return cur;
        };
        let split = tree.split_direction(cur).expect("inner frame has a split");
        cur = if split == movement_axis {
            right
        } else {
            match movement_axis {
                SplitDirection::Horizontal => {
                    if tree.rect(left).bottom() >= pivot { left } else { right }
                }
                SplitDirection::Vertical => {
                    if tree.rect(left).right() >= pivot { left } else { right }
                }
            }
        };
    }
}

/// Inserts `original` next to `target`: absorbs it if `target` is a void
/// (case S1), otherwise splits `target` with `original` on `is_left_split`'s
/// side — wrapping `original` first if it was itself a root, and
/// disconnecting it from its old position otherwise. Mirrors `do_resplit`.
fn do_resplit(
    tree: &mut FrameTree,
    mut target: FrameId,
    mut original: FrameId,
    is_left_split: bool,
    direction: SplitDirection,
    auto_equalize: bool,
    auto_remove_void: bool,
) -> crate::error::Result<()> {
    // If `target` shares `original`'s parent, removing `original` first
    // would invalidate `target`'s sibling slot; split off the parent instead.
    if let (Some(target_parent), Some(original_parent)) = (tree.parent(target), tree.parent(original)) {
        if target_parent == original_parent {
            target = target_parent;
        }
    }

    if tree.is_empty_leaf(target) {
        let window = tree.window(original);
        if let Some(window) = window {
            tree.set_window(target, Some(window))?;
        }
        if tree.parent(original).is_some() {
            splitting::remove(tree, original, auto_remove_void)?;
        }
        return Ok(());
    }

    if tree.parent(original).is_none() {
        // Wrap the root so it becomes a non-root leaf we can split off.
        let rect = tree.rect(original);
        let gaps = tree.gaps(original);
        let wrapper = tree.alloc_leaf(rect, gaps, None);
        // `original`'s content moves into `wrapper`; `original`'s id now
        // plays the role of the wrapping inner node produced by `split`.
        if let Some(window) = tree.window(original) {
            tree.set_window(wrapper, Some(window))?;
            tree.set_window(original, None)?;
        }
        original = wrapper;
    } else {
        splitting::remove(tree, original, auto_remove_void)?;
    }

    let side = if is_left_split { Side::Left } else { Side::Right };
    splitting::split(tree, target, Some(original), side, direction, auto_equalize, false)?;
    Ok(())
}

/// Relocates `frame` one step in `direction`, creating intermediate splits
/// as necessary and filling the vacated slot per `auto_fill_void`/sibling
/// promotion. Implements the five cases of §4.1 by porting
/// `move_frame_up_or_left`/`move_frame_down_or_right` (the two are mirror
/// images around each axis' "positive" sense).
pub fn move_frame(
    tree: &mut FrameTree,
    monitors: &MonitorSet,
    stash: &mut Stash,
    windows: &WindowRegistry,
    frame: FrameId,
    direction: Direction,
    auto_equalize: bool,
    auto_remove_void: bool,
    auto_fill_void: bool,
) -> crate::error::Result<bool> {
    let axis = direction.axis();
    let original = frame;
    let mut cur = frame;
    let mut is_left_split = direction.is_positive();

    while let Some(parent) = tree.parent(cur) {
        let on_matching_side = tree.split_direction(parent) == Some(axis)
            && tree.side_of_parent(cur) == Some(if direction.is_positive() { Side::Right } else { Side::Left });
        if !on_matching_side {
            break;
        }
        cur = parent;
    }

    let target = 'target: {
        if let Some(parent) = tree.parent(cur) {
            if tree.split_direction(parent) != Some(axis) {
                is_left_split = !is_left_split;
                break 'target Some(parent);
            }
        }

        let neighbor = get_parent_in_direction(tree, cur, direction);
        match neighbor {
            None => {
                let monitor = monitors.monitor_containing(tree.rect(original));
                let adjacent = monitor.and_then(|m| monitors.adjacent(m, direction));
                adjacent.map(|m| m.root_frame)
            }
            Some(n) => {
                if tree.children(n).is_some() {
                    let (px, py) = tree.rect(original).center();
                    let pivot = if axis == SplitDirection::Horizontal { py } else { px };
                    Some(descend_to_closest_leaf(tree, n, pivot, axis))
                } else {
                    is_left_split = !is_left_split;
                    Some(n)
                }
            }
        }
    };

    let Some(target) = target else {
        return Ok(false);
    };

    // `do_resplit` either promotes `original`'s sibling into its parent slot
    // (no void left behind) or, if `original` was the tree's root, wraps it
    // and leaves `original` itself as the surviving empty leaf — only that
    // case can have a void worth filling from the stash.
    let root_move = tree.parent(original).is_none();
    do_resplit(tree, target, original, is_left_split, axis, auto_equalize, auto_remove_void)?;
    if auto_fill_void && root_move && tree.is_empty_leaf(original) {
        stash::fill_void_with_stash(tree, stash, windows, original);
    }
    Ok(true)
}

/// Swaps the contents of two independent frames — leaf windows, or whole
/// subtrees if either is an inner node. If `to` is a void, `from`'s content
/// replaces it and `from` itself is collapsed via `remove` (mirroring
/// `exchange_frames`'s void-absorption branch); otherwise both sides trade
/// places wholesale.
pub fn exchange(tree: &mut FrameTree, auto_remove_void: bool, from: FrameId, to: FrameId) -> crate::error::Result<()> {
    if tree.is_empty_leaf(to) {
        move_into_void(tree, from, to)?;
        if tree.parent(from).is_some() {
            splitting::remove(tree, from, auto_remove_void)?;
        }
        return Ok(());
    }

    swap_subtrees(tree, from, to);
    Ok(())
}

fn move_into_void(tree: &mut FrameTree, from: FrameId, to: FrameId) -> crate::error::Result<()> {
    match tree.children(from) {
        Some((left, right)) => {
            let split = tree.split_direction(from).expect("inner frame has a split");
            let ratio = tree.ratio(from).expect("inner frame has a ratio");
            tree.replace_with_inner(to, left, right, split, ratio);
            tree.set_parent(left, Some(to));
            tree.set_parent(right, Some(to));
            super::sizing::resize(tree, to, tree.rect(to), true);
            tree.replace_with_leaf(from, Content::Empty);
        }
        None => {
            let window = tree.window(from);
            tree.set_window(to, window)?;
            tree.set_window(from, None)?;
        }
    }
    Ok(())
}

fn swap_subtrees(tree: &mut FrameTree, a: FrameId, b: FrameId) {
    let a_rect = tree.rect(a);
    let b_rect = tree.rect(b);
    match (tree.children(a), tree.children(b)) {
        (None, None) => {
            let a_window = tree.window(a);
            let b_window = tree.window(b);
            tree.set_window(a, b_window).expect("a is a leaf");
            tree.set_window(b, a_window).expect("b is a leaf");
        }
        _ => {
            let a_kind = (tree.children(a), tree.split_direction(a), tree.ratio(a), tree.window(a));
            let b_kind = (tree.children(b), tree.split_direction(b), tree.ratio(b), tree.window(b));

            match b_kind.0 {
                Some((l, r)) => {
                    tree.replace_with_inner(a, l, r, b_kind.1.unwrap(), b_kind.2.unwrap());
                    tree.set_parent(l, Some(a));
                    tree.set_parent(r, Some(a));
                }
                None => tree.replace_with_leaf(a, b_kind.3.map_or(Content::Empty, Content::Window)),
            }
            match a_kind.0 {
                Some((l, r)) => {
                    tree.replace_with_inner(b, l, r, a_kind.1.unwrap(), a_kind.2.unwrap());
                    tree.set_parent(l, Some(b));
                    tree.set_parent(r, Some(b));
                }
                None => tree.replace_with_leaf(b, a_kind.3.map_or(Content::Empty, Content::Window)),
            }
        }
    }
    super::sizing::resize(tree, a, a_rect, true);
    super::sizing::resize(tree, b, b_rect, true);
}
