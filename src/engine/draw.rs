//! Bar and label placement math.
//!
//! Pure functions over the current space triple, kept free of engine state so
//! they can be tested independently. All inputs are origin-relative data
//! units unless a name says px.

use crate::space::{Space, Transform};

/// Computes the scale + translate transform placing an interval bar.
///
/// The horizontal scale is a fraction of the view width, floored at one
/// pixel-equivalent so sub-pixel intervals remain visible. The translate is
/// the bar's pixel offset from the view's left edge. `data_per_px` is the
/// x-scale of the composed span-to-px matrix.
pub(crate) fn span_matrix(
    start: f64,
    duration: f64,
    view: &Space,
    data_per_px: f64,
    min_bar_px: f64,
) -> Transform {
    let min_span = min_bar_px * data_per_px;
    Transform {
        a: (duration / view.width).max(min_span / view.width),
        d: 1.0,
        e: (start - view.x) / data_per_px,
        f: 0.0,
    }
}

/// Decides where to draw a bar's inline text label so it stays legible.
///
/// Returns the label's pixel translate, or `None` when the bar is too narrow
/// and there is no free space on either side — the caller must not render
/// the label this frame.
pub(crate) fn span_text_placement(
    start: f64,
    duration: f64,
    view: &Space,
    physical_width: f64,
    data_per_px: f64,
    text_width_px: f64,
    padding_px: f64,
) -> Option<f64> {
    let end = start + duration;
    let start_px = (start - view.x) / data_per_px;
    let end_px = (end - view.x) / data_per_px;

    // Bar entirely before the view: pin to its right edge so the label sits
    // where the bar will scroll in from.
    if end <= view.x {
        return Some(end_px + padding_px);
    }
    // Bar entirely after the view: pin to its left edge.
    if start >= view.right() {
        return Some(start_px + padding_px);
    }

    let space_right_px = physical_width - end_px;
    if space_right_px > 0.0 && space_right_px >= text_width_px {
        return Some(end_px + padding_px);
    }

    let bar_px = duration / data_per_px;
    if space_right_px < 0.0 && bar_px > text_width_px {
        let visible_px = physical_width - start_px.max(0.0);
        if visible_px > text_width_px {
            // Keep the label on screen, hugging the view's right edge.
            return Some(physical_width - text_width_px - padding_px);
        }
        return Some(start_px + padding_px);
    }

    None
}

/// Computes the pixel translate of an overlay indicator at `timestamp`
/// (origin-relative). Returns `None` when the marker falls outside the
/// rendering surface.
pub(crate) fn indicator_translate(
    timestamp: f64,
    view: &Space,
    physical_width: f64,
    data_per_px: f64,
) -> Option<f64> {
    let px = (timestamp - view.x) / data_per_px;
    (0.0..=physical_width).contains(&px).then_some(px)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1000 data units across 1000 px: one data unit per pixel.
    fn full_view() -> Space {
        Space::sized(1000.0, 1.0)
    }

    #[test]
    fn test_span_matrix_scales_by_view_fraction() {
        let view = full_view();
        let m = span_matrix(250.0, 500.0, &view, 1.0, 1.0);

        assert!((m.a - 0.5).abs() < 1e-9);
        assert!((m.e - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_span_matrix_floors_subpixel_bars() {
        let view = full_view();
        let m = span_matrix(0.0, 0.001, &view, 1.0, 1.0);

        // One pixel-equivalent out of 1000.
        assert!((m.a - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_label_right_of_bar_with_room() {
        let view = full_view();
        let placed = span_text_placement(100.0, 200.0, &view, 1000.0, 1.0, 50.0, 8.0);
        assert_eq!(placed, Some(308.0));
    }

    #[test]
    fn test_label_pinned_for_offscreen_bars() {
        let view = Space::new(500.0, 0.0, 500.0, 1.0);

        // Bar entirely before the view: right edge + padding (negative px).
        let before = span_text_placement(100.0, 200.0, &view, 500.0, 1.0, 40.0, 8.0);
        assert_eq!(before, Some(-192.0));

        // Bar entirely after the view: left edge + padding.
        let after = span_text_placement(1200.0, 100.0, &view, 500.0, 1.0, 40.0, 8.0);
        assert_eq!(after, Some(708.0));
    }

    #[test]
    fn test_label_right_aligned_inside_wide_bar() {
        // Bar overflows the right edge but its visible portion fits the label.
        let view = full_view();
        let placed = span_text_placement(100.0, 2000.0, &view, 1000.0, 1.0, 120.0, 8.0);
        assert_eq!(placed, Some(1000.0 - 120.0 - 8.0));
    }

    #[test]
    fn test_label_falls_back_to_left_edge() {
        // Bar overflows the right edge, is wider than the label, but its
        // visible portion is not: place at the bar's left edge plus padding.
        let view = full_view();
        let placed = span_text_placement(950.0, 500.0, &view, 1000.0, 1.0, 120.0, 8.0);
        assert_eq!(placed, Some(958.0));
    }

    #[test]
    fn test_no_placement_when_nothing_fits() {
        // Bar covers the whole view and the label is wider than the bar.
        let view = Space::sized(100.0, 1.0);
        let placed = span_text_placement(0.0, 100.0, &view, 100.0, 1.0, 200.0, 8.0);
        assert_eq!(placed, None);
    }

    #[test]
    fn test_indicator_translate_clips_to_surface() {
        let view = Space::new(500.0, 0.0, 500.0, 1.0);
        assert_eq!(indicator_translate(750.0, &view, 500.0, 1.0), Some(250.0));
        assert_eq!(indicator_translate(100.0, &view, 500.0, 1.0), None);
        assert_eq!(indicator_translate(1100.0, &view, 500.0, 1.0), None);
    }
}
