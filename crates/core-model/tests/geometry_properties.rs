//! Property tests for the scale / geometry engine driven through `TextHost`.

use core_config::{TextLayoutOption, ViewportLineStrategy};
use core_model::{
    Geometry, HostDocument, HostView, ScaleState, ScrollRange, Size, TextHost, auto_shrink,
    visible_line_count,
};
use proptest::prelude::*;

const LINE_HEIGHT: f64 = 14.0;

fn document(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("fn item_{i}() {{}}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn geometry_for(host: &TextHost, control_height: u32, y_scale: f64) -> Geometry {
    let lines = host.line_count();
    let mut scale = ScaleState::new(0.6, y_scale);
    scale.recompute(LINE_HEIGHT, lines, f64::from(control_height));
    Geometry {
        line_height: LINE_HEIGHT,
        scale,
        document_lines: lines,
        scroll_bar_width: 120,
        control: Size::new(120, control_height),
    }
}

proptest! {
    #[test]
    fn shrink_is_bounded_and_fits_document(
        lines in 0usize..5_000,
        y_scale in 0.05f64..2.0,
        control in 0.0f64..4_000.0,
    ) {
        let s = auto_shrink(LINE_HEIGHT, lines, y_scale, control);
        prop_assert!(s > 0.0 && s <= 1.0);
        if control > 0.0 {
            let fitted = LINE_HEIGHT * lines as f64 * y_scale * s;
            prop_assert!(fitted <= control + 1e-6);
        }
    }

    #[test]
    fn shrink_never_grows_with_more_lines(
        lines in 0usize..5_000,
        extra in 0usize..5_000,
        control in 1.0f64..4_000.0,
    ) {
        let fewer = auto_shrink(LINE_HEIGHT, lines, 0.3, control);
        let more = auto_shrink(LINE_HEIGHT, lines + extra, 0.3, control);
        prop_assert!(more <= fewer);
    }

    #[test]
    fn pointer_mapping_is_monotone_and_clamped(
        lines in 1usize..400,
        rows in 1usize..80,
        control in 50u32..1_200,
        ys in prop::collection::vec(-200.0f64..2_000.0, 2..12),
    ) {
        let host = TextHost::new(&document(lines), TextLayoutOption::default(), rows);
        let geometry = geometry_for(&host, control, 0.3);
        let range = host.scroll();
        let visible = visible_line_count(&host, ViewportLineStrategy::Direct);
        let mut ys = ys;
        ys.sort_by(f64::total_cmp);
        let mut previous = i32::MIN;
        for y in ys {
            let v = geometry.pointer_to_scroll_value(y, range, visible);
            prop_assert!(v >= range.minimum && v <= range.maximum);
            prop_assert!(v >= previous);
            previous = v;
        }
    }

    #[test]
    fn clicking_indicator_centre_returns_current_value(
        lines in 60usize..400,
        rows in 2usize..50,
        control in 100u32..900,
        pick in 0.0f64..1.0,
    ) {
        let mut host = TextHost::new(&document(lines), TextLayoutOption::default(), rows);
        let max = host.scroll().maximum;
        host.set_scroll_value((f64::from(max) * pick) as i32);
        let geometry = geometry_for(&host, control, 0.3);
        let visible = visible_line_count(&host, ViewportLineStrategy::Direct);
        let rect = geometry.viewport_rect(host.scroll().value, visible);
        let back = geometry.pointer_to_scroll_value(rect.center_y(), host.scroll(), visible);
        prop_assert!((back - host.scroll().value).abs() <= 1);
    }

    #[test]
    fn indicator_stays_inside_document(
        lines in 1usize..400,
        rows in 1usize..80,
        control in 50u32..1_200,
        pick in 0.0f64..1.0,
    ) {
        let mut host = TextHost::new(&document(lines), TextLayoutOption::default(), rows);
        let max = host.scroll().maximum;
        host.set_scroll_value((f64::from(max) * pick) as i32);
        let geometry = geometry_for(&host, control, 0.3);
        let visible = visible_line_count(&host, ViewportLineStrategy::Direct);
        let rect = geometry.viewport_rect(host.scroll().value, visible);
        prop_assert!(rect.y >= 0.0);
        prop_assert!(rect.bottom() <= geometry.document_height_px().max(f64::from(control)) + 1e-6);
    }
}

#[test]
fn hundred_lines_in_seven_hundred_pixels() {
    let host = TextHost::new(&document(100), TextLayoutOption::default(), 50);
    let geometry = geometry_for(&host, 700, 1.0);
    assert_eq!(geometry.scale.auto_shrink, 0.5);
    let visible = visible_line_count(&host, ViewportLineStrategy::Direct);
    assert_eq!(visible, 50);
    let rect = geometry.viewport_rect(host.scroll().value, visible);
    assert_eq!(rect.y, 0.0);
    assert_eq!(rect.height, 350.0);
}

#[test]
fn legacy_strategy_matches_formula_and_never_goes_negative() {
    let host = TextHost::new(&document(100), TextLayoutOption::default(), 50);
    // 2 × 100 − 99 − 50
    assert_eq!(visible_line_count(&host, ViewportLineStrategy::Legacy), 51);

    let mut folded = TextHost::new(&document(10), TextLayoutOption::default(), 2);
    for block in 0..9 {
        folded.set_folded(block, true);
    }
    assert!(visible_line_count(&folded, ViewportLineStrategy::Legacy) >= 0);
}

#[test]
fn empty_range_maps_to_minimum() {
    let host = TextHost::new("", TextLayoutOption::default(), 10);
    let geometry = geometry_for(&host, 300, 0.3);
    assert_eq!(host.scroll(), ScrollRange::new(0, 0, 0));
    assert_eq!(geometry.pointer_to_scroll_value(150.0, host.scroll(), 1), 0);
}
