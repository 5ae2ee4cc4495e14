//! Simulations of membership churn against shared rings.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, Ring};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_ring(rng: &mut StdRng, min: usize, max: usize) -> Ring {
    let ring = Ring::new();
    let target = rng.random_range(min..=max);
    while ring.len() < target {
        ring.add_node(format!("node-{:08x}", rng.random::<u32>()));
    }
    ring
}

fn random_keys(rng: &mut StdRng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| format!("key-{:016x}", rng.random::<u64>()))
        .collect()
}

fn owners(ring: &Ring, keys: &[String]) -> HashMap<String, String> {
    keys.iter()
        .map(|k| (k.clone(), ring.get(k).unwrap()))
        .collect()
}

fn assert_sorted(ring: &Ring) {
    let nodes = ring.nodes();
    for pair in nodes.windows(2) {
        assert!(pair[0] < pair[1], "{} before {}", pair[0], pair[1]);
    }
}

#[test]
fn test_removal_only_moves_victims_keys() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        let ring = random_ring(&mut rng, 2, 24);
        let keys = random_keys(&mut rng, 2000);
        let before = owners(&ring, &keys);
        let heirs: HashMap<&String, String> = keys
            .iter()
            .map(|k| (k, ring.successors(k)[1].clone()))
            .collect();

        let ids = ring.config().nodes;
        let victim = ids[rng.random_range(0..ids.len())].clone();
        ring.remove_node(&victim).unwrap();

        for key in &keys {
            let now = ring.get(key).unwrap();
            if before[key] == victim {
                assert_eq!(now, heirs[key], "{key} should pass to the successor");
            } else {
                assert_eq!(now, before[key], "{key} moved without its owner leaving");
            }
        }
    }
}

#[test]
fn test_addition_only_claims_keys_for_newcomer() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0xadd);

    for _ in 0..50 {
        let ring = random_ring(&mut rng, 1, 24);
        let keys = random_keys(&mut rng, 2000);
        let before = owners(&ring, &keys);

        let newcomer = format!("newcomer-{:08x}", rng.random::<u32>());
        assert!(ring.add_node(newcomer.clone()));

        for key in &keys {
            let now = ring.get(key).unwrap();
            assert!(
                now == before[key] || now == newcomer,
                "{key} moved from {} to {now}",
                before[key]
            );
        }
    }
}

#[test]
fn test_random_churn_keeps_invariants() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(42);
    let ring = Ring::new();
    let mut expected = HashSet::new();

    for _ in 0..5000 {
        let id = format!("node-{}", rng.random_range(0..64));
        if rng.random_bool(0.5) {
            assert_eq!(ring.add_node(id.clone()), expected.insert(id));
        } else {
            match ring.remove_node(&id) {
                Ok(()) => assert!(expected.remove(&id)),
                Err(Error::NodeNotFound(missing)) => {
                    assert_eq!(missing, id);
                    assert!(!expected.contains(&id));
                }
                Err(e) => panic!("unexpected error {e}"),
            }
        }

        assert_eq!(ring.len(), expected.len());
        if expected.is_empty() {
            assert_eq!(ring.get("probe"), Err(Error::RingEmpty));
        } else {
            assert!(expected.contains(&ring.get("probe").unwrap()));
        }
    }

    assert_sorted(&ring);
    let members: HashSet<String> = ring.config().nodes.into_iter().collect();
    assert_eq!(members, expected);
}

#[test]
fn test_membership_round_trip() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let ring = random_ring(&mut rng, 0, 16);
        let before = ring.config();
        let id = format!("transient-{:08x}", rng.random::<u32>());

        ring.add_node(id.clone());
        ring.remove_node(&id).unwrap();

        assert_eq!(ring.config(), before);
    }
}

#[test]
fn test_concurrent_lookups_during_churn() {
    init_logging();
    let stable = ["cache-1", "cache-2", "cache-3", "cache-4"];
    let ring = Ring::from_nodes(stable);
    let allowed: HashSet<&str> = stable.iter().copied().chain(["flappy"]).collect();

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..2000 {
                ring.add_node("flappy");
                ring.remove_node("flappy").unwrap();
            }
        });

        for t in 0..4 {
            let ring = &ring;
            let allowed = &allowed;
            s.spawn(move || {
                for i in 0..5000 {
                    let owner = ring.get(format!("key-{t}-{i}")).unwrap();
                    assert!(allowed.contains(owner.as_str()), "unknown owner {owner}");
                }
            });
        }
    });

    assert_eq!(ring.config().nodes.len(), stable.len());
    assert!(!ring.contains("flappy"));
    assert_sorted(&ring);
}
