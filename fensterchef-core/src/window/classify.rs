//! Initial-mode classification (§4.2's seven-step rule), grounded on
//! `original_source/src/window_properties.c`'s ordering of
//! `_NET_WM_STATE`/`_NET_WM_WINDOW_TYPE`/transient-for/size-hint checks.

use super::{Mode, NetWmState, Properties, WindowType};

/// Classifies a freshly-mapped window's initial [`Mode`] from its cached
/// properties, in the fixed order the spec gives: fullscreen/maximized
/// state, then dock (by type or non-empty strut), then desktop, then
/// transient, then equal min/max size, then "has a type list without
/// `NORMAL`", falling through to tiling.
#[must_use]
pub fn classify(properties: &Properties) -> Mode {
    let NetWmState {
        fullscreen,
        maximized_vert,
        maximized_horz,
        ..
    } = properties.net_wm_state;
    if fullscreen || maximized_vert || maximized_horz {
        return Mode::Fullscreen;
    }

    if properties.window_types.contains(&WindowType::Dock) || properties.strut.is_some() {
        return Mode::Dock;
    }

    if properties.window_types.contains(&WindowType::Desktop) {
        return Mode::Desktop;
    }

    if properties.transient_for.is_some() {
        return Mode::Floating;
    }

    let hints = &properties.size_hints;
    let equal_min_max = matches!((hints.min_width, hints.max_width), (Some(a), Some(b)) if a == b)
        || matches!((hints.min_height, hints.max_height), (Some(a), Some(b)) if a == b);
    if equal_min_max {
        return Mode::Floating;
    }

    if !properties.window_types.is_empty() && !properties.window_types.contains(&WindowType::Normal) {
        return Mode::Floating;
    }

    Mode::Tiling
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Properties {
        Properties::default()
    }

    #[test]
    fn plain_window_is_tiling() {
        assert_eq!(classify(&base()), Mode::Tiling);
    }

    #[test]
    fn fullscreen_state_wins_over_everything() {
        let mut props = base();
        props.net_wm_state.fullscreen = true;
        props.transient_for = Some(super::super::WindowId(1));
        assert_eq!(classify(&props), Mode::Fullscreen);
    }

    #[test]
    fn dock_type_classifies_as_dock() {
        let mut props = base();
        props.window_types.push(WindowType::Dock);
        assert_eq!(classify(&props), Mode::Dock);
    }

    #[test]
    fn strut_alone_classifies_as_dock() {
        let mut props = base();
        props.strut = Some(crate::geometry::Strut {
            left: 0,
            right: 0,
            top: 20,
            bottom: 0,
        });
        assert_eq!(classify(&props), Mode::Dock);
    }

    #[test]
    fn transient_is_floating() {
        let mut props = base();
        props.transient_for = Some(super::super::WindowId(42));
        assert_eq!(classify(&props), Mode::Floating);
    }

    #[test]
    fn fixed_size_is_floating() {
        let mut props = base();
        props.size_hints.min_width = Some(200);
        props.size_hints.max_width = Some(200);
        assert_eq!(classify(&props), Mode::Floating);
    }

    #[test]
    fn non_normal_type_list_is_floating() {
        let mut props = base();
        props.window_types.push(WindowType::Dialog);
        assert_eq!(classify(&props), Mode::Floating);
    }

    #[test]
    fn normal_in_type_list_stays_tiling() {
        let mut props = base();
        props.window_types.push(WindowType::Normal);
        assert_eq!(classify(&props), Mode::Tiling);
    }
}
