//! Tests for deterministic RNG
//!
//! CRITICAL: Determinism is sacred. Same seed MUST produce same sequence.

use flowprobe_core_rs::RngManager;

#[test]
fn test_rng_new_with_seed() {
    let rng = RngManager::new(12345);
    assert_eq!(rng.get_state(), 12345);
}

#[test]
fn test_rng_next_deterministic() {
    let mut rng1 = RngManager::new(12345);
    let mut rng2 = RngManager::new(12345);

    for _ in 0..100 {
        assert_eq!(rng1.next(), rng2.next(), "RNG not deterministic!");
    }
}

#[test]
fn test_rng_different_seeds_different_sequences() {
    let mut rng1 = RngManager::new(12345);
    let mut rng2 = RngManager::new(54321);

    assert_ne!(
        rng1.next(),
        rng2.next(),
        "Different seeds should produce different values"
    );
}

#[test]
fn test_rng_range_inclusive_covers_bounds() {
    let mut rng = RngManager::new(12345);
    let mut seen_min = false;
    let mut seen_max = false;

    for _ in 0..2000 {
        let val = rng.range_inclusive(1, 3);
        assert!((1..=3).contains(&val), "Value {} out of range [1, 3]", val);
        seen_min |= val == 1;
        seen_max |= val == 3;
    }

    assert!(seen_min && seen_max, "Both bounds should be reachable");
}

#[test]
fn test_uniform_stays_in_jitter_band() {
    let mut rng = RngManager::new(777);

    for _ in 0..1000 {
        let jitter = rng.uniform(0.7, 1.3);
        assert!(
            (0.7..1.3).contains(&jitter),
            "jitter {} outside [0.7, 1.3)",
            jitter
        );
    }
}

#[test]
fn test_chance_rate_is_plausible() {
    let mut rng = RngManager::new(2024);
    let hits = (0..10_000).filter(|_| rng.chance(0.3)).count();

    // 30% ± 3% over 10k trials
    assert!((2_700..=3_300).contains(&hits), "hits = {}", hits);
}

#[test]
fn test_uuid_sequence_is_reproducible_and_unique() {
    let mut rng1 = RngManager::new(42);
    let mut rng2 = RngManager::new(42);

    let ids1: Vec<_> = (0..500).map(|_| rng1.uuid()).collect();
    let ids2: Vec<_> = (0..500).map(|_| rng2.uuid()).collect();
    assert_eq!(ids1, ids2);

    let unique: std::collections::HashSet<_> = ids1.iter().collect();
    assert_eq!(unique.len(), ids1.len());
}
