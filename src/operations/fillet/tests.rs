#![allow(clippy::unwrap_used)]

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use approx::assert_relative_eq;
use proptest::prelude::*;

use super::{CrossingType, FilletArc, FilletConfig};
use crate::error::FilletError;
use crate::geometry::curve::{Arc, Curve, CurveDomain, EdgeCurve, Ellipse, Line};
use crate::math::transform::{mirror_matrix, transform_point};
use crate::math::{Matrix4, Point3, Tolerance, Vector3};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn seg(a: Point3, b: Point3) -> EdgeCurve {
    Line::segment(a, b).unwrap().into()
}

fn circle(center: Point3, radius: f64) -> EdgeCurve {
    Arc::circle(center, radius, Vector3::z(), Vector3::x())
        .unwrap()
        .into()
}

fn corner() -> [EdgeCurve; 2] {
    [
        seg(p(0.0, 0.0, 0.0), p(20.0, 0.0, 0.0)),
        seg(p(0.0, 0.0, 0.0), p(0.0, 20.0, 0.0)),
    ]
}

fn picked(a: Point3, b: Point3) -> FilletConfig {
    let mut config = FilletConfig::new();
    config.set_pick_points([a, b]);
    config
}

#[test]
fn corner_fillet_is_quarter_arc_and_trims() {
    let mut curves = corner();
    let mut config = picked(p(10.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    config
        .initialize_from_pick_points([&curves[0], &curves[1]], 5.0)
        .unwrap();
    assert!(config.is_initialized());
    assert_eq!(config.crossing_type(), CrossingType::LeftToRight);
    assert_eq!(config.is_incoming(), [false, false]);

    let arc = config.evaluate(true, &mut curves, 5.0, [true, true], false).unwrap();
    assert_relative_eq!(*arc.center(), p(5.0, 5.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(arc.radius(), 5.0);
    assert_relative_eq!(arc.sweep(), FRAC_PI_2, epsilon = 1e-9);
    assert_relative_eq!(*arc.ref_dir(), -Vector3::x(), epsilon = 1e-9);
    assert_relative_eq!(arc.start_point(), p(0.0, 5.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(arc.end_point(), p(5.0, 0.0, 0.0), epsilon = 1e-9);

    for curve in &curves {
        let domain = curve.domain();
        assert_relative_eq!(domain.t_min, 5.0, epsilon = 1e-9);
        assert_relative_eq!(domain.t_max, 20.0, epsilon = 1e-9);
    }
    assert_relative_eq!(config.params()[0], 5.0, epsilon = 1e-9);
    assert_relative_eq!(
        config.intersection_point().unwrap(),
        p(0.0, 0.0, 0.0),
        epsilon = 1e-9
    );
}

#[test]
fn short_segment_is_extended_to_tangency() {
    let mut curves = [
        seg(p(8.0, 0.0, 0.0), p(20.0, 0.0, 0.0)),
        seg(p(0.0, 0.0, 0.0), p(0.0, 20.0, 0.0)),
    ];
    let mut config = picked(p(14.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    let arc = config.evaluate(true, &mut curves, 5.0, [true, false], false).unwrap();
    assert_relative_eq!(*arc.center(), p(5.0, 5.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(curves[0].domain().t_min, -3.0, epsilon = 1e-9);
    assert_relative_eq!(curves[0].start_point().unwrap(), p(5.0, 0.0, 0.0), epsilon = 1e-9);
    assert_eq!(curves[1].domain(), CurveDomain::new(0.0, 20.0));
}

#[test]
fn failed_trim_changes_nothing() {
    let mut curves = corner();
    let mut config = picked(p(10.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    config.evaluate(true, &mut curves, 5.0, [false, false], false).unwrap();

    // The tangency at x = 5 lies past the end of this segment.
    let mut moved = [seg(p(-30.0, 0.0, 0.0), p(2.0, 0.0, 0.0)), curves[1].clone()];
    let before_curves = moved.clone();
    let before_config = config.clone();
    let err = config
        .evaluate(true, &mut moved, 5.0, [true, true], false)
        .unwrap_err();
    assert!(matches!(err, FilletError::InvalidGeometry(_)));
    assert_eq!(moved, before_curves);
    assert_eq!(config, before_config);
}

#[test]
fn zero_radius_yields_intersection_point() {
    let mut curves = [
        seg(p(-10.0, 0.0, 0.0), p(10.0, 0.0, 0.0)),
        seg(p(0.0, -10.0, 0.0), p(0.0, 10.0, 0.0)),
    ];
    let mut config = picked(p(5.0, 0.0, 0.0), p(0.0, 5.0, 0.0));
    let arc = config.evaluate(true, &mut curves, 0.0, [false, false], false).unwrap();
    assert!(arc.is_degenerate());
    assert_relative_eq!(*arc.center(), p(0.0, 0.0, 0.0), epsilon = 1e-9);
    assert_eq!(config.arc_end_points(), [*arc.center(); 2]);
    assert_eq!(config.intersection_point(), Some(*arc.center()));
}

#[test]
fn parallel_lines_have_no_corner_fillet() {
    let mut curves = [
        seg(p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0)),
        seg(p(0.0, 3.0, 0.0), p(10.0, 3.0, 0.0)),
    ];
    let mut config = picked(p(5.0, 0.0, 0.0), p(5.0, 3.0, 0.0));
    let err = config
        .evaluate(true, &mut curves, 1.0, [false, false], false)
        .unwrap_err();
    assert!(matches!(err, FilletError::InvalidGeometry(_)));
    assert!(!config.is_initialized());
}

#[test]
fn mirrored_inputs_give_mirrored_arc() {
    let mut curves = corner();
    let mut config = picked(p(10.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    let arc = config.evaluate(true, &mut curves, 5.0, [false, false], false).unwrap();

    let m = mirror_matrix(&Point3::origin(), &Vector3::x());
    let mut mirrored = curves.clone().map(|c| c.transformed(&m).unwrap());
    config.transform_by(&m);
    // The mirrored pair normal is -Z, so each side maps onto its image.
    assert_eq!(config.crossing_type(), CrossingType::LeftToRight);

    let again = config.evaluate(true, &mut mirrored, 5.0, [false, false], false).unwrap();
    assert_relative_eq!(*again.center(), p(-5.0, 5.0, 0.0), epsilon = 1e-9);
    assert!(again.is_equal_to(&arc.transformed(&m).unwrap(), &Tolerance::default()));
}

#[test]
fn turning_the_plane_over_keeps_the_fillet() {
    let mut curves = corner();
    let mut config = picked(p(10.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    config.evaluate(true, &mut curves, 5.0, [false, false], false).unwrap();

    // A half turn about x shows the plane from below.
    let m = Matrix4::from_axis_angle(&Vector3::x_axis(), PI);
    let mut turned = curves.clone().map(|c| c.transformed(&m).unwrap());
    config.transform_by(&m);
    let arc = config.evaluate(true, &mut turned, 5.0, [false, false], false).unwrap();
    assert_relative_eq!(*arc.center(), p(5.0, -5.0, 0.0), epsilon = 1e-9);
    // x × (-y): the normal turned with the curves.
    assert_relative_eq!(*arc.normal(), -Vector3::z(), epsilon = 1e-9);
}

#[test]
fn slight_tilt_of_a_vertical_corner_keeps_the_fillet() {
    let curves = [
        seg(p(0.0, 0.0, 0.0), p(20.0, 0.0, 0.0)),
        seg(p(0.0, 0.0, 0.0), p(0.0, 0.0, 20.0)),
    ];
    let mut solved = picked(p(10.0, 0.0, 0.0), p(0.0, 0.0, 10.0));
    let mut inputs = curves.clone();
    let arc = solved.evaluate(true, &mut inputs, 5.0, [false, false], false).unwrap();
    assert_relative_eq!(*arc.center(), p(5.0, 0.0, 5.0), epsilon = 1e-9);

    // Either way, the fillet plane's normal crosses the XY plane.
    for angle in [1e-4, -1e-4] {
        let m = Matrix4::from_axis_angle(&Vector3::x_axis(), angle);
        let mut tilted = curves.clone().map(|c| c.transformed(&m).unwrap());
        let mut config = solved.clone();
        config.transform_by(&m);
        let again = config.evaluate(true, &mut tilted, 5.0, [false, false], false).unwrap();
        assert_relative_eq!(
            *again.center(),
            transform_point(&m, &p(5.0, 0.0, 5.0)),
            epsilon = 1e-9
        );
        assert_eq!(config.crossing_type(), solved.crossing_type());
    }
}

fn two_circles() -> [EdgeCurve; 2] {
    [circle(p(0.0, 0.0, 0.0), 10.0), circle(p(15.0, 0.0, 0.0), 10.0)]
}

#[test]
fn circle_pair_picks_select_distinct_fillets() {
    let h = (13.0f64 * 13.0 - 7.5 * 7.5).sqrt();

    let mut upper_curves = two_circles();
    let mut upper = picked(p(6.43, 7.66, 0.0), p(8.57, 7.66, 0.0));
    let upper_arc = upper
        .evaluate(true, &mut upper_curves, 3.0, [false, false], false)
        .unwrap();
    assert_relative_eq!(*upper_arc.center(), p(7.5, h, 0.0), epsilon = 1e-9);
    assert_eq!(upper.crossing_type(), CrossingType::LeftToRight);
    assert_eq!(upper.is_incoming(), [false, true]);

    let mut lower_curves = two_circles();
    let mut lower = picked(p(6.43, -7.66, 0.0), p(8.57, -7.66, 0.0));
    let lower_arc = lower
        .evaluate(true, &mut lower_curves, 3.0, [false, false], false)
        .unwrap();
    assert_relative_eq!(*lower_arc.center(), p(7.5, -h, 0.0), epsilon = 1e-9);
    assert_eq!(lower.crossing_type(), CrossingType::RightToLeft);

    let tol = Tolerance::default();
    assert!(!upper_arc.is_equal_to(&lower_arc, &tol));

    // Re-evaluating unchanged inputs reproduces each fillet.
    for _ in 0..3 {
        let again = upper
            .evaluate(true, &mut upper_curves, 3.0, [false, false], false)
            .unwrap();
        assert!(again.is_equal_to(&upper_arc, &tol));
        let again = lower
            .evaluate(true, &mut lower_curves, 3.0, [false, false], false)
            .unwrap();
        assert!(again.is_equal_to(&lower_arc, &tol));
    }
    assert_relative_eq!(upper.intersection_point().unwrap().y, (100.0f64 - 56.25).sqrt(), epsilon = 1e-9);
}

#[test]
fn moving_a_circle_keeps_the_fillet_side() {
    let mut curves = two_circles();
    let mut config = picked(p(6.43, 7.66, 0.0), p(8.57, 7.66, 0.0));
    config.evaluate(true, &mut curves, 3.0, [false, false], false).unwrap();

    let nudge = Matrix4::new_translation(&Vector3::new(-0.1, 0.15, 0.0));
    let shift = Matrix4::new_translation(&Vector3::new(0.3, 0.2, 0.0));
    curves[0] = curves[0].transformed(&nudge).unwrap();
    curves[1] = curves[1].transformed(&shift).unwrap();
    let arc = config.evaluate(true, &mut curves, 3.0, [false, false], false).unwrap();
    assert!(arc.center().y > 5.0);
    assert_relative_eq!((arc.center() - p(-0.1, 0.15, 0.0)).norm(), 13.0, epsilon = 1e-9);
    assert_relative_eq!((arc.center() - p(15.3, 0.2, 0.0)).norm(), 13.0, epsilon = 1e-9);
}

#[test]
fn tangent_curves_get_a_half_turn_fillet() {
    let mut curves = [seg(p(-10.0, 0.0, 0.0), p(0.0, 0.0, 0.0)), circle(p(0.0, 2.0, 0.0), 1.0)];
    let mut config = picked(p(-0.5, 0.0, 0.0), p(0.0, 1.0, 0.0));
    let arc = config.evaluate(true, &mut curves, 0.5, [true, true], false).unwrap();
    assert_relative_eq!(*arc.center(), p(0.0, 0.5, 0.0), epsilon = 1e-7);
    assert_relative_eq!(arc.sweep(), PI, epsilon = 1e-9);
    assert_relative_eq!(arc.point_at(FRAC_PI_2), p(0.5, 0.5, 0.0), epsilon = 1e-7);
    assert_eq!(config.is_incoming(), [true, true]);
    assert_eq!(config.crossing_type(), CrossingType::RightToLeft);

    let domain = curves[0].domain();
    assert_relative_eq!(domain.t_min, 0.0, epsilon = 1e-9);
    assert_relative_eq!(domain.t_max, 10.0, epsilon = 1e-7);
    assert_relative_eq!(curves[0].end_point().unwrap(), p(0.0, 0.0, 0.0), epsilon = 1e-7);
}

fn ellipse(major: Vector3) -> EdgeCurve {
    Ellipse::new(p(0.0, 0.0, 0.0), 10.0, 4.0, Vector3::z(), major, 0.0, TAU)
        .unwrap()
        .into()
}

#[test]
fn ellipse_fillet_follows_nearest_crossing() {
    let mut curves = [ellipse(Vector3::x()), ellipse(Vector3::y())];
    let picks = [curves[0].evaluate(1.0), curves[1].evaluate(-1.0)];
    let mut config = picked(picks[0], picks[1]);
    let arc = config.evaluate(true, &mut curves, 0.5, [false, false], false).unwrap();
    assert!(arc.center().x > 3.7 && arc.center().y > 3.7);
    assert_eq!(config.crossing_type(), CrossingType::RightToLeft);

    // Q3 matches the configuration too; continuity keeps the Q1 fillet.
    let shift = Matrix4::new_translation(&Vector3::new(0.05, -0.03, 0.0));
    curves[1] = curves[1].transformed(&shift).unwrap();
    let moved = config.evaluate(true, &mut curves, 0.5, [false, false], false).unwrap();
    assert!(moved.center().x > 3.0 && moved.center().y > 3.0);
    assert!((moved.center() - arc.center()).norm() < 0.2);
}

#[test]
fn probe_leaves_configuration_untouched() {
    let curves = corner();
    let config = picked(p(10.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    let (arc, trimmed) = config.probe(&curves, 5.0, [true, true], false).unwrap();
    assert!(!config.is_initialized());
    assert_relative_eq!(*arc.center(), p(5.0, 5.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(trimmed[0].domain().t_min, 5.0, epsilon = 1e-9);
}

#[test]
fn dragged_line_is_reanchored_on_intersection() {
    let mut curves = corner();
    let mut config = picked(p(10.0, 0.0, 0.0), p(0.0, 10.0, 0.0));
    config.evaluate(true, &mut curves, 5.0, [true, true], false).unwrap();
    assert_relative_eq!(config.arc_end_points()[0], p(5.0, 0.0, 0.0), epsilon = 1e-9);

    // The far end moves; the end at the fillet stays put.
    let dragged = seg(p(5.0, 0.0, 0.0), p(20.0, 4.0, 0.0));
    let mut adjusted = dragged.clone();
    assert!(config.adjust_tweaked_line(&mut adjusted, 0));
    assert_relative_eq!(adjusted.start_point().unwrap(), p(0.0, 0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(adjusted.end_point().unwrap(), p(20.0, 4.0, 0.0), epsilon = 1e-9);

    let mut inputs = [dragged, curves[1].clone()];
    config.evaluate(true, &mut inputs, 5.0, [true, true], true).unwrap();
    let start = inputs[0].start_point().unwrap();
    assert_relative_eq!(start.coords.cross(&Vector3::new(20.0, 4.0, 0.0)).norm(), 0.0, epsilon = 1e-6);
    // The cached intersection lies on the re-anchored line.
    assert_relative_eq!(config.intersection_point().unwrap(), p(0.0, 0.0, 0.0), epsilon = 1e-9);

    // Nothing to adjust when the fillet end has moved away.
    let mut elsewhere = seg(p(6.0, 1.0, 0.0), p(20.0, 4.0, 0.0));
    assert!(!config.adjust_tweaked_line(&mut elsewhere, 0));
}

#[test]
fn record_round_trip_restores_state() {
    let mut curves = two_circles();
    let mut config = picked(p(6.43, 7.66, 0.0), p(8.57, 7.66, 0.0));
    let arc = config.evaluate(true, &mut curves, 3.0, [false, false], false).unwrap();

    let json = serde_json::to_string(&config.to_record()).unwrap();
    let mut restored = FilletConfig::from_record(&serde_json::from_str(&json).unwrap());
    assert_eq!(restored, config);
    let again = restored
        .evaluate(false, &mut curves, 3.0, [false, false], false)
        .unwrap();
    assert_eq!(again, arc);

    let fresh = picked(p(1.0, 2.0, 3.0), p(4.0, 5.0, 6.0));
    let record = fresh.to_record();
    assert!(record.pick_points.is_some());
    assert_eq!(FilletConfig::from_record(&record), fresh);
}

fn corner_at(angle: f64) -> ([EdgeCurve; 2], [Point3; 2]) {
    let dir = Vector3::new(angle.cos(), angle.sin(), 0.0);
    let curves = [
        seg(p(0.0, 0.0, 0.0), p(200.0, 0.0, 0.0)),
        seg(p(0.0, 0.0, 0.0), Point3::from(dir * 200.0)),
    ];
    (curves, [p(10.0, 0.0, 0.0), Point3::from(dir * 10.0)])
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(angle in 0.3f64..2.8, radius in 0.5f64..4.0) {
        let (curves, picks) = corner_at(angle);
        let mut config = picked(picks[0], picks[1]);
        config.initialize_from_pick_points([&curves[0], &curves[1]], radius).unwrap();

        let (first, _) = config.probe(&curves, radius, [true, true], false).unwrap();
        let (second, _) = config.probe(&curves, radius, [true, true], false).unwrap();
        prop_assert_eq!(&first, &second);

        let mut inputs = curves.clone();
        let evaluated: FilletArc = config
            .evaluate(false, &mut inputs, radius, [false, false], false)
            .unwrap();
        prop_assert_eq!(&evaluated, &first);

        // The arc is tangent to both lines at the fillet radius.
        let center = *first.center();
        prop_assert!((center.y - radius).abs() < 1e-6);
        let normal1 = Vector3::new(-angle.sin(), angle.cos(), 0.0);
        prop_assert!((center.coords.dot(&normal1).abs() - radius).abs() < 1e-6);
    }
}
