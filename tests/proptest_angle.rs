use goniometry::landmark::Side;
use goniometry::metric::{metric_angle, raw_angle, resolve_operands, Metric};
use proptest::prelude::*;

mod proptest_helpers;

fn arb_metric() -> impl Strategy<Value = Metric> {
    prop::sample::select(Metric::ALL.to_vec())
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Right), Just(Side::Left)]
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn raw_angle_ignores_operand_order(
        p1 in proptest_helpers::arb_point(),
        vertex in proptest_helpers::arb_point(),
        p3 in proptest_helpers::arb_point(),
    ) {
        prop_assert_eq!(raw_angle(p1, vertex, p3), raw_angle(p3, vertex, p1));
    }

    #[test]
    fn raw_angle_stays_in_range(
        p1 in proptest_helpers::arb_point(),
        vertex in proptest_helpers::arb_point(),
        p3 in proptest_helpers::arb_point(),
    ) {
        let angle = raw_angle(p1, vertex, p3);
        prop_assert!((0.0..=180.0).contains(&angle), "angle {} out of range", angle);
    }

    #[test]
    fn raw_angle_agrees_with_dot_product(
        p1 in proptest_helpers::arb_grid_point(),
        vertex in proptest_helpers::arb_grid_point(),
        p3 in proptest_helpers::arb_grid_point(),
    ) {
        prop_assume!(p1 != vertex && p3 != vertex);
        let expected = proptest_helpers::acos_angle(p1, vertex, p3).expect("non-zero rays");
        let angle = raw_angle(p1, vertex, p3);
        prop_assert!(
            (angle - expected).abs() < proptest_helpers::EPS_ACOS_DEGREES,
            "atan2 {} vs acos {}", angle, expected
        );
    }

    #[test]
    fn every_metric_stays_in_range(
        set in proptest_helpers::arb_leg_landmarks(),
        metric in arb_metric(),
        side in arb_side(),
    ) {
        let angle = metric_angle(metric, side, &set).expect("all leg landmarks present");
        prop_assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn r1_always_equals_r2(set in proptest_helpers::arb_leg_landmarks(), side in arb_side()) {
        prop_assert_eq!(
            metric_angle(Metric::R1, side, &set).unwrap(),
            metric_angle(Metric::R2, side, &set).unwrap()
        );
    }

    #[test]
    fn mirrored_subject_gives_same_angle_on_other_side(
        set in proptest_helpers::arb_leg_landmarks(),
        metric in arb_metric(),
        axis in -500i32..500,
    ) {
        prop_assume!(proptest_helpers::positions_distinct(&set));
        let mirrored = set.mirrored(f64::from(axis));

        for side in [Side::Right, Side::Left] {
            let original = metric_angle(metric, side, &set).unwrap();
            let reflected = metric_angle(metric, side.opposite(), &mirrored).unwrap();
            prop_assert!(
                (original - reflected).abs() < proptest_helpers::EPS_DEGREES,
                "{} {}: {} vs {}", metric, side, original, reflected
            );
        }
    }

    #[test]
    fn synthetic_reference_points_sit_one_offset_away(
        set in proptest_helpers::arb_leg_landmarks(),
        side in arb_side(),
    ) {
        let hip = resolve_operands(Metric::HipFlexion, side, &set).unwrap();
        prop_assert_eq!(hip.last.y, hip.vertex.y);
        prop_assert_eq!((hip.last.x - hip.vertex.x).abs(), 100.0);

        let popliteal = resolve_operands(Metric::Popliteal, side, &set).unwrap();
        prop_assert_eq!(popliteal.last.x, popliteal.vertex.x);
        prop_assert_eq!(popliteal.vertex.y - popliteal.last.y, 100.0);
    }
}
