//! # Sparse Set Scenario Tests
//!
//! End-to-end behavior of a single storage through the public API.

use strata_ecs::{EcsConfig, Entity, EntityAllocator, SparseSet};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

/// Checks the sparse/dense cross-links through the public accessors.
fn assert_linked<T>(set: &SparseSet<T>)
where
    T: 'static,
{
    assert_eq!(set.dense().len(), set.components().len());
    for (i, &entity) in set.dense().iter().enumerate() {
        assert_eq!(set.index_of(entity), Some(i), "{entity} is not linked to slot {i}");
    }
}

/// Test: 300 entities force one growth of the sparse index.
#[test]
fn test_growth_past_first_block() {
    let mut entities = EntityAllocator::new();
    let mut positions = SparseSet::new();

    let ids: Vec<Entity> = (0..300).map(|_| entities.create()).collect();
    for (i, &e) in ids.iter().enumerate() {
        positions.emplace(e, Position { x: i as f32, y: 0.0 });
    }

    assert_eq!(positions.len(), 300);
    assert_eq!(positions.sparse_capacity(), 512);
    assert_eq!(positions.sparse_capacity() % EcsConfig::default().sparse_block_size, 0);
    for (i, &e) in ids.iter().enumerate() {
        assert_eq!(positions.get(e).map(|p| p.x), Some(i as f32));
    }
    assert_linked(&positions);
}

/// Test: removing an entity that never had the component changes nothing.
#[test]
fn test_remove_never_emplaced() {
    let mut positions = SparseSet::new();
    positions.emplace(Entity::from_raw(1), Position { x: 1.0, y: 1.0 });
    positions.emplace(Entity::from_raw(2), Position { x: 2.0, y: 2.0 });
    let before: Vec<Entity> = positions.dense().to_vec();

    assert_eq!(positions.remove(Entity::from_raw(7)), None);
    assert_eq!(positions.remove(Entity::from_raw(10_000)), None);

    assert_eq!(positions.dense(), before.as_slice());
    assert_eq!(positions.sparse_capacity(), 256);
    assert_linked(&positions);
}

/// Test: removal keeps every remaining entity reachable.
#[test]
fn test_removal_from_the_middle() {
    let mut positions = SparseSet::new();
    for raw in 0..5 {
        positions.emplace(Entity::from_raw(raw), Position { x: raw as f32, y: 0.0 });
    }

    let removed = positions.remove(Entity::from_raw(1));
    assert_eq!(removed, Some(Position { x: 1.0, y: 0.0 }));
    assert_eq!(positions.len(), 4);
    assert!(!positions.contains(Entity::from_raw(1)));

    // The last entity filled the hole.
    assert_eq!(positions.dense()[1], Entity::from_raw(4));
    assert_eq!(positions.get(Entity::from_raw(4)).map(|p| p.x), Some(4.0));
    assert_linked(&positions);
}

/// Test: an entity can be given the component again after removal.
#[test]
fn test_reemplace_after_remove() {
    let mut positions = SparseSet::new();
    let e = Entity::from_raw(42);

    positions.emplace(e, Position { x: 1.0, y: 1.0 });
    positions.remove(e);
    assert_eq!(positions.emplace(e, Position { x: 2.0, y: 2.0 }), None);
    assert_eq!(positions.get(e), Some(&Position { x: 2.0, y: 2.0 }));
    assert_linked(&positions);
}

/// Test: a small block size from TOML drives growth granularity.
#[test]
fn test_config_from_toml_controls_growth() {
    let config = EcsConfig::from_toml_str("sparse_block_size = 16\ndense_capacity = 8").unwrap();
    let mut positions = SparseSet::with_config(config);

    assert_eq!(positions.sparse_capacity(), 16);
    positions.emplace(Entity::from_raw(40), Position { x: 0.0, y: 0.0 });
    assert_eq!(positions.sparse_capacity(), 48);
}
