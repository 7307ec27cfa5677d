//! # Sparse Set Storage
//!
//! Per-component-type storage with O(1) emplace, lookup and removal.
//!
//! ```text
//! sparse:     [ 1,  -,  0,  -,  2, ...]   entity -> dense index
//! dense:      [E2, E0, E4]                 index  -> entity
//! components: [C2, C0, C4]                 index  -> component
//! ```
//!
//! `dense` and `components` are always gap-free. Removal moves the last
//! element into the vacated slot, so dense order is **not** stable across
//! removals.

use std::any::{self, Any};

use super::component::{Component, ComponentKey};
use super::entity::Entity;
use crate::config::EcsConfig;

/// Sparse index marker for "no component".
const ABSENT: usize = usize::MAX;

/// Dense storage for a single component type.
///
/// # Invariants
///
/// - `dense[i]` and `components[i]` describe the same entity.
/// - `sparse[e] == i` if and only if `dense[i] == e`.
/// - `sparse[e] == ABSENT` if and only if `e` has no component here.
///
/// # Example
///
/// ```
/// use strata_ecs::{Entity, SparseSet};
///
/// let mut healths: SparseSet<u32> = SparseSet::new();
/// let e = Entity::from_raw(3);
/// healths.emplace(e, 100);
/// *healths.get_mut(e).unwrap() -= 10;
/// assert_eq!(healths.get(e), Some(&90));
/// ```
pub struct SparseSet<T> {
    /// Entity slot -> dense index, or `ABSENT`.
    sparse: Vec<usize>,
    /// Entities holding this component, in storage order.
    dense: Vec<Entity>,
    /// Component values, index-aligned with `dense`.
    components: Vec<T>,
    /// Growth policy.
    config: EcsConfig,
}

impl<T: Component> SparseSet<T> {
    /// Creates an empty set with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EcsConfig::default())
    }

    /// Creates an empty set with the given allocation settings.
    ///
    /// The sparse index starts one block long; the dense arrays reserve
    /// `dense_capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `config.sparse_block_size` is zero.
    #[must_use]
    pub fn with_config(config: EcsConfig) -> Self {
        assert!(
            config.sparse_block_size > 0,
            "sparse_block_size must be greater than zero"
        );

        Self {
            sparse: vec![ABSENT; config.sparse_block_size],
            dense: Vec::with_capacity(config.dense_capacity),
            components: Vec::with_capacity(config.dense_capacity),
            config,
        }
    }

    /// Attaches `value` to `entity`.
    ///
    /// If the entity already holds a component it is overwritten in place and
    /// the previous value is returned; its dense slot does not move.
    pub fn emplace(&mut self, entity: Entity, value: T) -> Option<T> {
        let slot = entity.index();
        self.ensure_slot(slot);

        if let Some(index) = self.index_of(entity) {
            return Some(std::mem::replace(&mut self.components[index], value));
        }

        self.sparse[slot] = self.dense.len();
        self.dense.push(entity);
        self.components.push(value);
        None
    }

    /// Returns the component of `entity`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index_of(entity).map(|index| &self.components[index])
    }

    /// Returns the component of `entity` mutably, if present.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.index_of(entity).map(|index| &mut self.components[index])
    }

    /// Detaches the component from `entity` and returns it.
    ///
    /// The last element is moved into the vacated slot, so this is O(1) but
    /// reorders the dense arrays. Returns `None` if the entity had no
    /// component here.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.index_of(entity)?;

        let value = self.components.swap_remove(index);
        self.dense.swap_remove(index);
        if let Some(&moved) = self.dense.get(index) {
            self.sparse[moved.index()] = index;
        }
        self.sparse[entity.index()] = ABSENT;

        Some(value)
    }

    /// Checks if `entity` holds a component here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index_of(entity).is_some()
    }

    /// Position of `entity` in the dense arrays.
    #[inline]
    #[must_use]
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&index) if index != ABSENT => Some(index),
            _ => None,
        }
    }

    /// Entities currently present, in dense order.
    #[inline]
    #[must_use]
    pub fn dense(&self) -> &[Entity] {
        &self.dense
    }

    /// Component values, index-aligned with [`dense`](Self::dense).
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Mutable component values, index-aligned with [`dense`](Self::dense).
    #[inline]
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Iterates over `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.dense.iter().copied().zip(self.components.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.dense.iter().copied().zip(self.components.iter_mut())
    }

    /// Number of entities holding this component.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Checks if no entity holds this component.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Current length of the sparse index.
    ///
    /// Always a multiple of the configured block size.
    #[inline]
    #[must_use]
    pub fn sparse_capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Drops every component. The sparse index keeps its capacity.
    pub fn clear(&mut self) {
        for entity in &self.dense {
            self.sparse[entity.index()] = ABSENT;
        }
        self.dense.clear();
        self.components.clear();
    }

    /// Grows the sparse index so `slot` is addressable.
    fn ensure_slot(&mut self, slot: usize) {
        if slot < self.sparse.len() {
            return;
        }

        let new_len = self.config.aligned_capacity(slot + 1);
        tracing::trace!(
            component = any::type_name::<T>(),
            from = self.sparse.len(),
            to = new_len,
            "growing sparse index"
        );
        self.sparse.resize(new_len, ABSENT);
    }
}

impl<T: Component> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`SparseSet`].
///
/// This lets the registry hold every component type in one map, and lets
/// dynamic iteration drive storages whose concrete type it never names.
pub trait ErasedStorage: Any {
    /// Identity of the stored component type.
    fn key(&self) -> ComponentKey;

    /// Number of entities holding this component.
    fn len(&self) -> usize;

    /// Checks if no entity holds this component.
    fn is_empty(&self) -> bool;

    /// Entities currently present, in dense order.
    fn dense(&self) -> &[Entity];

    /// Checks if `entity` holds a component here.
    fn contains(&self, entity: Entity) -> bool;

    /// Returns the component of `entity` as `Any`.
    fn get_erased(&self, entity: Entity) -> Option<&dyn Any>;

    /// Returns the component of `entity` mutably as `Any`.
    fn get_erased_mut(&mut self, entity: Entity) -> Option<&mut dyn Any>;

    /// Detaches the component from `entity`, dropping it.
    ///
    /// Returns `true` if a component was removed.
    fn remove_erased(&mut self, entity: Entity) -> bool;

    /// Drops every component.
    fn clear(&mut self);

    /// Converts to `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts to mutable `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for SparseSet<T> {
    fn key(&self) -> ComponentKey {
        ComponentKey::of::<T>()
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }

    fn dense(&self) -> &[Entity] {
        self.dense()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn get_erased(&self, entity: Entity) -> Option<&dyn Any> {
        self.get(entity).map(|c| c as &dyn Any)
    }

    fn get_erased_mut(&mut self, entity: Entity) -> Option<&mut dyn Any> {
        self.get_mut(entity).map(|c| c as &mut dyn Any)
    }

    fn remove_erased(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn clear(&mut self) {
        self.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
