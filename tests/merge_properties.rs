//! Merge Property Tests
//!
//! Randomized trees checked against a BTreeSet model:
//! - Enumerated output equals the model, strictly ascending
//! - Deferred flags follow the structural rules
//! - Predicate answers match the model for deferred roots
//! - Skip-ahead lands where the model says
//! - Driver selection never changes output
//!
//! Seeds are fixed so failures reproduce.

use std::collections::BTreeSet;

use aerologic::config::{DriverSelection, EvaluationConfig};
use aerologic::nested::{IteratorErrorCode, NestedIterator, VecSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const UNIVERSE: u32 = 64;
const SEEDS: u64 = 300;

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone)]
enum Model {
    Leaf(BTreeSet<u32>),
    And(Vec<Model>, Vec<Model>),
    Or(Vec<Model>, Vec<Model>),
}

impl Model {
    fn random(rng: &mut StdRng, depth: u32) -> Self {
        if depth == 0 || rng.gen_bool(0.35) {
            let density = rng.gen_range(0.05..0.6);
            let keys = (0..UNIVERSE).filter(|_| rng.gen_bool(density)).collect();
            return Model::Leaf(keys);
        }

        let includes = (0..rng.gen_range(0..=3))
            .map(|_| Model::random(rng, depth - 1))
            .collect();
        let excludes = (0..rng.gen_range(0..=2))
            .map(|_| Model::random(rng, depth - 1))
            .collect();
        if rng.gen_bool(0.5) {
            Model::And(includes, excludes)
        } else {
            Model::Or(includes, excludes)
        }
    }

    fn holds(&self, e: u32) -> bool {
        match self {
            Model::Leaf(keys) => keys.contains(&e),
            Model::And(includes, excludes) => {
                includes.iter().all(|m| m.holds(e)) && !excludes.iter().any(|m| m.holds(e))
            }
            Model::Or(includes, excludes) => {
                includes.iter().any(|m| m.holds(e)) || excludes.iter().any(|m| !m.holds(e))
            }
        }
    }

    fn deferred(&self) -> bool {
        match self {
            Model::Leaf(_) => false,
            Model::And(includes, _) => includes.iter().all(Model::deferred),
            Model::Or(includes, excludes) => {
                !excludes.is_empty() || includes.iter().any(Model::deferred)
            }
        }
    }

    fn expected(&self) -> BTreeSet<u32> {
        (0..UNIVERSE).filter(|&e| self.holds(e)).collect()
    }

    fn build(&self) -> NestedIterator<u32> {
        let build_all = |models: &[Model]| -> Vec<NestedIterator<u32>> {
            models.iter().map(Model::build).collect()
        };
        match self {
            Model::Leaf(keys) => {
                NestedIterator::leaf(VecSource::from_sorted(keys.iter().copied().collect()))
            }
            Model::And(includes, excludes) => {
                NestedIterator::and(build_all(includes), build_all(excludes))
            }
            Model::Or(includes, excludes) => {
                NestedIterator::or(build_all(includes), build_all(excludes))
            }
        }
    }
}

fn enumerate(tree: &mut NestedIterator<u32>) -> Vec<u32> {
    tree.keys().collect::<Result<_, _>>().unwrap()
}

// =============================================================================
// Enumeration Properties
// =============================================================================

/// Enumerable roots produce exactly the model's set, strictly ascending.
#[test]
fn test_enumeration_matches_model() {
    let mut checked = 0;
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let model = Model::random(&mut rng, 3);
        if model.deferred() {
            continue;
        }

        let mut tree = model.build();
        tree.initialize().unwrap();
        let keys = enumerate(&mut tree);

        assert!(keys.windows(2).all(|w| w[0] < w[1]), "seed {}: not ascending", seed);
        let expected: Vec<u32> = model.expected().into_iter().collect();
        assert_eq!(keys, expected, "seed {}: {}", seed, tree);
        checked += 1;
    }
    assert!(checked > SEEDS / 4, "too few enumerable trees: {}", checked);
}

/// Deferred flags follow the structural rules at every root.
#[test]
fn test_deferred_flag_rules() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let model = Model::random(&mut rng, 3);

        let mut tree = model.build();
        tree.initialize_predicate().unwrap();
        assert_eq!(tree.is_deferred().unwrap(), model.deferred(), "seed {}", seed);
    }
}

/// Deferred roots are rejected, and answer membership like the model.
#[test]
fn test_deferred_roots_as_predicates() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let model = Model::random(&mut rng, 3);
        if !model.deferred() {
            continue;
        }

        let mut rejected = model.build();
        let err = rejected.initialize().unwrap_err();
        assert_eq!(err.code(), IteratorErrorCode::AeroQueryNoDrivingTerm);

        let mut tree = model.build();
        tree.initialize_predicate().unwrap();
        // check past the universe too: complements are unbounded
        for e in 0..UNIVERSE + 8 {
            assert_eq!(tree.is_member(&e).unwrap(), model.holds(e), "seed {} e {}", seed, e);
        }
    }
}

// =============================================================================
// Boolean Laws
// =============================================================================

/// !A AND !B accepts exactly what A OR B rejects.
#[test]
fn test_de_morgan() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = Model::random(&mut rng, 0);
        let b = Model::random(&mut rng, 0);

        let mut nor = Model::And(vec![], vec![a.clone(), b.clone()]).build();
        nor.initialize_predicate().unwrap();
        let mut union = Model::Or(vec![a, b], vec![]).build();
        union.initialize_predicate().unwrap();

        for e in 0..UNIVERSE {
            assert_eq!(nor.is_member(&e).unwrap(), !union.is_member(&e).unwrap());
        }
    }
}

/// And of one include reproduces it; Or of two is their sorted union.
#[test]
fn test_identity_and_union() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (Model::Leaf(a), Model::Leaf(b)) =
            (Model::random(&mut rng, 0), Model::random(&mut rng, 0))
        else {
            unreachable!("depth 0 always yields leaves");
        };

        let mut identity = Model::And(vec![Model::Leaf(a.clone())], vec![]).build();
        identity.initialize().unwrap();
        assert_eq!(enumerate(&mut identity), a.iter().copied().collect::<Vec<_>>());

        let mut union =
            Model::Or(vec![Model::Leaf(a.clone()), Model::Leaf(b.clone())], vec![]).build();
        union.initialize().unwrap();
        assert_eq!(enumerate(&mut union), a.union(&b).copied().collect::<Vec<_>>());
    }
}

// =============================================================================
// Skip-Ahead and Driver Properties
// =============================================================================

/// Interleaved move_to / next agree with the model.
#[test]
fn test_move_to_matches_model() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let model = Model::random(&mut rng, 3);
        if model.deferred() {
            continue;
        }
        let expected = model.expected();

        let mut tree = model.build();
        tree.initialize().unwrap();

        let mut pos = 0u32;
        loop {
            let target = pos + rng.gen_range(0..8);
            let want = expected.range(target.max(pos)..).next().copied();
            let got = tree.move_to(&target).unwrap();
            assert_eq!(got, want, "seed {} target {}", seed, target);

            let Some(value) = got else {
                break;
            };
            assert_eq!(tree.next().unwrap(), value);
            pos = value + 1;
        }
        assert!(!tree.has_next().unwrap());
    }
}

/// SmallestHint and First produce identical output.
#[test]
fn test_driver_selection_equivalence() {
    let smallest = EvaluationConfig::with_driver(DriverSelection::SmallestHint);
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let model = Model::random(&mut rng, 3);
        if model.deferred() {
            continue;
        }

        let mut first = model.build();
        first.initialize().unwrap();
        let mut hinted = model.build();
        hinted.initialize_with(&smallest).unwrap();

        assert_eq!(enumerate(&mut first), enumerate(&mut hinted), "seed {}", seed);
    }
}
