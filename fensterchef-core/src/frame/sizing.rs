//! Resize, edge-bump and equalize, ported from `src/frame_sizing.c`:
//! `resize_frame`/`resize_frame_and_ignore_ratio`, `propagate_size`,
//! `bump_frame_edge`, `get_minimum_frame_size`, `equalize_frame` and its
//! `count_horizontal_frames`/`count_vertical_frames` helpers.

use crate::geometry::{Direction, Rect, SplitDirection};

use super::{FrameId, FrameTree, MIN_FRAME_SIZE, Ratio};
use super::moving::{get_left_frame, get_right_frame, get_above_frame, get_below_frame};

/// Writes `rect` onto `frame`, then recurses into children.
///
/// `respect_ratio = true` divides the child axis by the frame's stored
/// ratio, matching `resize_frame`. `respect_ratio = false` instead keeps the
/// children's *current* proportions (falling back to 50/50 if either child
/// is currently zero-sized), matching `resize_frame_and_ignore_ratio` — used
/// when a parent changes size but the split itself did not move.
pub fn resize(tree: &mut FrameTree, frame: FrameId, rect: Rect, respect_ratio: bool) {
    tree.set_rect(frame, rect);

    let Some((left, right)) = tree.children(frame) else {
        return;
    };
    let split = tree.split_direction(frame).expect("inner frame has a split");

    match split {
        SplitDirection::Horizontal => {
            let left_width = if respect_ratio {
                share_of(tree.ratio(frame).expect("inner frame has a ratio"), rect.width)
            } else {
                let lw = tree.rect(left).width;
                let rw = tree.rect(right).width;
                if lw == 0 || rw == 0 {
                    rect.width / 2
                } else {
                    (u64::from(rect.width) * u64::from(lw) / u64::from(lw + rw)) as u32
                }
            };
            resize(
                tree,
                left,
                Rect::new(rect.x, rect.y, left_width, rect.height),
                respect_ratio,
            );
            resize(
                tree,
                right,
                Rect::new(rect.x + left_width as i32, rect.y, rect.width - left_width, rect.height),
                respect_ratio,
            );
        }
        SplitDirection::Vertical => {
            let left_height = if respect_ratio {
                share_of(tree.ratio(frame).expect("inner frame has a ratio"), rect.height)
            } else {
                let lh = tree.rect(left).height;
                let rh = tree.rect(right).height;
                if lh == 0 || rh == 0 {
                    rect.height / 2
                } else {
                    (u64::from(rect.height) * u64::from(lh) / u64::from(lh + rh)) as u32
                }
            };
            resize(
                tree,
                left,
                Rect::new(rect.x, rect.y, rect.width, left_height),
                respect_ratio,
            );
            resize(
                tree,
                right,
                Rect::new(rect.x, rect.y + left_height as i32, rect.width, rect.height - left_height),
                respect_ratio,
            );
        }
    }
}

fn share_of(ratio: Ratio, total: u32) -> u32 {
    if ratio.denominator == 0 {
        total / 2
    } else {
        (u64::from(total) * u64::from(ratio.numerator) / u64::from(ratio.denominator)) as u32
    }
}

/// Minimum width/height `frame` (and hence any ancestor chain ending in it)
/// can shrink to, gaps included. Leaves bottom out at [`MIN_FRAME_SIZE`].
pub fn minimum_size(tree: &FrameTree, frame: FrameId) -> (u32, u32) {
    let (mut width, mut height) = match tree.children(frame) {
        Some((left, right)) => {
            let (lw, lh) = minimum_size(tree, left);
            let (rw, rh) = minimum_size(tree, right);
            match tree.split_direction(frame).expect("inner frame has a split") {
                SplitDirection::Vertical => (lw.max(rw), lh + rh),
                SplitDirection::Horizontal => (lw + rw, lh.max(rh)),
            }
        }
        None => (MIN_FRAME_SIZE, MIN_FRAME_SIZE),
    };
    let gaps = tree.gaps(frame);
    width += (gaps.outer.left + gaps.outer.right).max(0) as u32;
    height += (gaps.outer.top + gaps.outer.bottom).max(0) as u32;
    (width, height)
}

/// Propagates ratio/position/size to every ancestor of `frame` whose split
/// direction matches `direction`, computing the ancestor's ratio and extent
/// directly from its (already up to date) children — `propagate_size`.
fn propagate_size(tree: &mut FrameTree, mut frame: FrameId, direction: SplitDirection) {
    while let Some(parent) = tree.parent(frame) {
        frame = parent;
        if tree.split_direction(frame) != Some(direction) {
            continue;
        }
        let (left, right) = tree.children(frame).expect("inner frame has children");
        let left_rect = tree.rect(left);
        let right_rect = tree.rect(right);
        match direction {
            SplitDirection::Horizontal => {
                let denominator = left_rect.width + right_rect.width;
                tree.set_ratio(frame, Ratio::new(right_rect.width, denominator))
                    .expect("frame is inner");
                let mut rect = tree.rect(frame);
                rect.x = left_rect.x;
                rect.width = denominator;
                tree.set_rect(frame, rect);
            }
            SplitDirection::Vertical => {
                let denominator = left_rect.height + right_rect.height;
                tree.set_ratio(frame, Ratio::new(right_rect.height, denominator))
                    .expect("frame is inner");
                let mut rect = tree.rect(frame);
                rect.y = left_rect.y;
                rect.height = denominator;
                tree.set_rect(frame, rect);
            }
        }
    }
}

/// Grows (positive `amount`) or shrinks (negative) the edge of `frame` on
/// `edge`'s side, clamped by the relevant neighbor's minimum size; when that
/// neighbor is already at its minimum the bump cascades outward to the
/// neighbor's own far edge. Returns the delta actually applied, which is
/// always `|result| <= |amount|` and shares `amount`'s sign (or is 0).
///
/// `LEFT`/`TOP` are implemented by delegating to the mirrored `RIGHT`/
/// `BOTTOM` case on the neighbor with a negated amount, exactly as
/// `bump_frame_edge` does.
pub fn bump_edge(tree: &mut FrameTree, frame: FrameId, edge: Direction, amount: i32) -> i32 {
    if tree.parent(frame).is_none() || amount == 0 {
        return 0;
    }

    match edge {
        Direction::Left => {
            let Some(neighbor) = get_left_frame(tree, frame) else {
                return 0;
            };
            return -bump_edge(tree, neighbor, Direction::Right, -amount);
        }
        Direction::Up => {
            let Some(neighbor) = get_above_frame(tree, frame) else {
                return 0;
            };
            return -bump_edge(tree, neighbor, Direction::Down, -amount);
        }
        _ => {}
    }

    let (axis, right_neighbor) = match edge {
        Direction::Right => (SplitDirection::Horizontal, get_right_frame(tree, frame)),
        Direction::Down => (SplitDirection::Vertical, get_below_frame(tree, frame)),
        Direction::Left | Direction::Up => unreachable!("handled above"),
    };
    let Some(right) = right_neighbor else {
        return 0;
    };
    let left = match edge {
        Direction::Right => get_left_frame(tree, right).unwrap_or(frame),
        Direction::Down => get_above_frame(tree, right).unwrap_or(frame),
        _ => unreachable!(),
    };

    let applied = if amount < 0 {
        let (min_w, min_h) = minimum_size(tree, left);
        let left_rect = tree.rect(left);
        let min_extent = if axis == SplitDirection::Horizontal { min_w } else { min_h };
        let extent = if axis == SplitDirection::Horizontal { left_rect.width } else { left_rect.height };
        let mut space = min_extent as i32 - extent as i32;
        space = space.min(0);
        let mut applied = amount.max(space);
        if space > amount {
            let got = bump_edge(
                tree,
                left,
                if axis == SplitDirection::Horizontal { Direction::Left } else { Direction::Up },
                -amount + space,
            );
            space -= got;
            applied = amount.max(space);
        }
        applied
    } else {
        let (min_w, min_h) = minimum_size(tree, right);
        let right_rect = tree.rect(right);
        let min_extent = if axis == SplitDirection::Horizontal { min_w } else { min_h };
        let extent = if axis == SplitDirection::Horizontal { right_rect.width } else { right_rect.height };
        let mut space = extent as i32 - min_extent as i32;
        space = space.max(0);
        let mut applied = amount.min(space);
        if space < amount {
            let got = bump_edge(
                tree,
                right,
                if axis == SplitDirection::Horizontal { Direction::Right } else { Direction::Down },
                amount - space,
            );
            space += got;
            applied = amount.min(space);
        }
        applied
    };

    let left_rect = tree.rect(left);
    let right_rect = tree.rect(right);
    match axis {
        SplitDirection::Horizontal => {
            resize(
                tree,
                left,
                Rect::new(left_rect.x, left_rect.y, (left_rect.width as i32 + applied) as u32, left_rect.height),
                false,
            );
            resize(
                tree,
                right,
                Rect::new(
                    right_rect.x + applied,
                    right_rect.y,
                    (right_rect.width as i32 - applied) as u32,
                    right_rect.height,
                ),
                false,
            );
        }
        SplitDirection::Vertical => {
            resize(
                tree,
                left,
                Rect::new(left_rect.x, left_rect.y, left_rect.width, (left_rect.height as i32 + applied) as u32),
                false,
            );
            resize(
                tree,
                right,
                Rect::new(
                    right_rect.x,
                    right_rect.y + applied,
                    right_rect.width,
                    (right_rect.height as i32 - applied) as u32,
                ),
                false,
            );
        }
    }

    propagate_size(tree, left, axis);
    propagate_size(tree, right, axis);

    applied
}

/// Leaves counted along `direction`: at a node split in `direction`, the sum
/// of both children's counts (more splits in that direction add columns/
/// rows); at a node split the other way, the max (parallel columns don't
/// add up). Mirrors `count_horizontal_frames`/`count_vertical_frames`.
fn leaf_count(tree: &FrameTree, frame: FrameId, direction: SplitDirection) -> u32 {
    let Some((left, right)) = tree.children(frame) else {
        return 1;
    };
    let split = tree.split_direction(frame).expect("inner frame has a split");
    let left_count = leaf_count(tree, left, direction);
    let right_count = leaf_count(tree, right, direction);
    if split == direction {
        left_count + right_count
    } else {
        left_count.max(right_count)
    }
}

/// Redivides every descendant of `frame` whose split direction is
/// `direction` so its two children have shares proportional to their leaf
/// counts along that direction; recurses unconditionally into both children
/// regardless of their own split direction, matching `equalize_frame`
/// (including the open question in `DESIGN.md` about chain-wide
/// re-equalization).
pub fn equalize(tree: &mut FrameTree, frame: FrameId, direction: SplitDirection) {
    let Some((left, right)) = tree.children(frame) else {
        return;
    };
    if tree.split_direction(frame) == Some(direction) {
        let left_count = leaf_count(tree, left, direction);
        let right_count = leaf_count(tree, right, direction);
        let rect = tree.rect(frame);
        match direction {
            SplitDirection::Horizontal => {
                let left_width = (u64::from(rect.width) * u64::from(left_count)
                    / u64::from(left_count + right_count)) as u32;
                let left_rect = tree.rect(left);
                resize(tree, left, Rect::new(left_rect.x, left_rect.y, left_width, rect.height), false);
                resize(
                    tree,
                    right,
                    Rect::new(rect.x + left_width as i32, rect.y, rect.width - left_width, rect.height),
                    false,
                );
            }
            SplitDirection::Vertical => {
                let left_height = (u64::from(rect.height) * u64::from(left_count)
                    / u64::from(left_count + right_count)) as u32;
                let left_rect = tree.rect(left);
                resize(tree, left, Rect::new(left_rect.x, left_rect.y, rect.width, left_height), false);
                resize(
                    tree,
                    right,
                    Rect::new(rect.x, rect.y + left_height as i32, rect.width, rect.height - left_height),
                    false,
                );
            }
        }
    }
    equalize(tree, left, direction);
    equalize(tree, right, direction);
}

/// Walks up from `frame` to the outermost ancestor whose split direction is
/// `direction` (keeping track of the last such ancestor seen, the way
/// `apply_auto_equalize` does, so a direction-matching chain interrupted by
/// an orthogonal split is not walked past), then equalizes that whole
/// subtree.
pub fn apply_auto_equalize(tree: &mut FrameTree, frame: FrameId, direction: SplitDirection) {
    let mut start_from = frame;
    let mut cur = frame;
    while let Some(parent) = tree.parent(cur) {
        if tree.split_direction(parent) == Some(direction) {
            start_from = parent;
        }
        cur = parent;
    }
    equalize(tree, start_from, direction);
}
