//! Tests for the capacity controller
//!
//! Capacities must stay inside [min, max] no matter what the RNG draws.

use chrono::Utc;
use flowprobe_core_rs::models::{Entity, Envelope, SimulationSession};
use flowprobe_core_rs::orchestrator::ScalingConfig;
use flowprobe_core_rs::{CapacityController, RngManager};
use proptest::prelude::*;
use uuid::Uuid;

fn session(order: u32, payment: u32) -> SimulationSession {
    SimulationSession::new(Uuid::nil(), Utc::now(), order, payment)
}

/// Scaling config whose probability draws always succeed.
fn certain() -> ScalingConfig {
    ScalingConfig {
        scale_up_probability: 1.0,
        scale_down_probability: 1.0,
        ..ScalingConfig::default()
    }
}

#[test]
fn test_no_scale_up_at_max_capacity() {
    // Headroom is zero, so not even a certain draw may scale up.
    let controller = CapacityController::new(certain());

    for seed in 0..200 {
        let mut rng = RngManager::new(seed);
        let mut s = session(12, 2);
        let result = controller.maybe_scale(20.0, Entity::Order, &mut s, &mut rng);

        assert!(result.is_none(), "seed {} produced {:?}", seed, result);
        assert_eq!(s.capacity(Entity::Order), 12);
    }
}

#[test]
fn test_no_scale_down_at_min_capacity() {
    let controller = CapacityController::new(certain());

    for seed in 0..200 {
        let mut rng = RngManager::new(seed);
        let mut s = session(2, 1);
        assert!(controller
            .maybe_scale(5.0, Entity::Payment, &mut s, &mut rng)
            .is_none());
        assert_eq!(s.capacity(Entity::Payment), 1);
    }
}

#[test]
fn test_scale_up_factor_clamped_to_headroom() {
    let controller = CapacityController::new(certain());

    for seed in 0..200 {
        let mut rng = RngManager::new(seed);
        let mut s = session(11, 2);
        match controller.maybe_scale(35.0, Entity::Order, &mut s, &mut rng) {
            Some(Envelope::ScaleUp { entity, factor }) => {
                assert_eq!(entity, Entity::Order);
                assert_eq!(factor, 1);
                assert_eq!(s.capacity(Entity::Order), 12);
            }
            other => panic!("expected scale-up, got {:?}", other),
        }
    }
}

#[test]
fn test_scale_down_factor_clamped_to_slack() {
    let controller = CapacityController::new(certain());
    let mut rng = RngManager::new(5);
    let mut s = session(2, 2);

    match controller.maybe_scale(5.0, Entity::Order, &mut s, &mut rng) {
        Some(Envelope::ScaleDown { factor, .. }) => {
            assert_eq!(factor, 1);
            assert_eq!(s.capacity(Entity::Order), 1);
        }
        other => panic!("expected scale-down, got {:?}", other),
    }
}

#[test]
fn test_thresholds_are_strict() {
    let controller = CapacityController::new(certain());
    let mut rng = RngManager::new(9);
    let mut s = session(5, 5);

    // Exactly at either threshold nothing happens.
    assert!(controller
        .maybe_scale(15.0, Entity::Order, &mut s, &mut rng)
        .is_none());
    assert!(controller
        .maybe_scale(10.0, Entity::Order, &mut s, &mut rng)
        .is_none());
    assert_eq!(s.capacity(Entity::Order), 5);
}

#[test]
fn test_zero_probability_never_scales() {
    let controller = CapacityController::new(ScalingConfig {
        scale_up_probability: 0.0,
        scale_down_probability: 0.0,
        ..ScalingConfig::default()
    });
    let mut rng = RngManager::new(1);
    let mut s = session(5, 5);

    for _ in 0..500 {
        assert!(controller
            .maybe_scale(30.0, Entity::Order, &mut s, &mut rng)
            .is_none());
        assert!(controller
            .maybe_scale(2.0, Entity::Payment, &mut s, &mut rng)
            .is_none());
    }
}

#[test]
fn test_custom_thresholds_are_honored() {
    let controller = CapacityController::new(ScalingConfig {
        scale_up_threshold: 50.0,
        ..certain()
    });
    let mut rng = RngManager::new(1);
    let mut s = session(5, 5);

    assert!(controller
        .maybe_scale(40.0, Entity::Order, &mut s, &mut rng)
        .is_none());
    assert!(matches!(
        controller.maybe_scale(60.0, Entity::Order, &mut s, &mut rng),
        Some(Envelope::ScaleUp { .. })
    ));
}

proptest! {
    #[test]
    fn prop_capacity_stays_in_bounds(
        seed in any::<u64>(),
        initial_order in 1u32..=12,
        initial_payment in 1u32..=12,
        rates in proptest::collection::vec(0.0f64..50.0, 1..100),
    ) {
        let controller = CapacityController::new(ScalingConfig::default());
        let mut rng = RngManager::new(seed);
        let mut s = session(initial_order, initial_payment);

        for rate in rates {
            for entity in Entity::ALL {
                let before = s.capacity(entity);
                let signal = controller.maybe_scale(rate, entity, &mut s, &mut rng);
                let after = s.capacity(entity);

                prop_assert!((1..=12).contains(&after));
                match signal {
                    Some(Envelope::ScaleUp { entity: e, factor }) => {
                        prop_assert_eq!(e, entity);
                        prop_assert!(factor >= 1);
                        prop_assert_eq!(after, before + factor);
                    }
                    Some(Envelope::ScaleDown { entity: e, factor }) => {
                        prop_assert_eq!(e, entity);
                        prop_assert!(factor >= 1);
                        prop_assert_eq!(after, before - factor);
                    }
                    Some(other) => prop_assert!(false, "unexpected envelope {:?}", other),
                    None => prop_assert_eq!(after, before),
                }
            }
        }
    }
}
