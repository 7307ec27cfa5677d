//! # ECS Registry
//!
//! The central container for all component storages.
//!
//! One [`SparseSet`] exists per component type, created lazily on first
//! emplace (or up front via [`Registry::register`]) and kept for the
//! registry's lifetime.

use std::collections::HashMap;

use super::component::{Component, ComponentKey};
use super::entity::Entity;
use super::sparse_set::{ErasedStorage, SparseSet};
use crate::config::EcsConfig;
use crate::error::EcsResult;

/// Owner of every sparse set, addressed by component type identity.
///
/// # Borrowing
///
/// References handed out by [`get`](Self::get), [`get_mut`](Self::get_mut)
/// and the iteration helpers borrow the registry, so the compiler rejects
/// holding them across a call that could move storage.
///
/// # Example
///
/// ```
/// use strata_ecs::{EntityAllocator, Registry};
///
/// struct Position(f32);
/// struct Velocity(f32);
///
/// let mut entities = EntityAllocator::new();
/// let mut registry = Registry::new();
///
/// let e = entities.create();
/// registry.emplace(e, Position(0.0));
/// registry.emplace(e, Velocity(2.0));
///
/// registry.iterate2::<Position, Velocity, _>(|_, pos, vel| pos.0 += vel.0);
/// assert_eq!(registry.get::<Position>(e).map(|p| p.0), Some(2.0));
/// ```
#[derive(Default)]
pub struct Registry {
    /// Type-erased storages keyed by component type.
    pub(crate) storages: HashMap<ComponentKey, Box<dyn ErasedStorage>>,
    /// Allocation settings for new storages.
    config: EcsConfig,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose storages use `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig)
    /// if the configuration fails validation.
    pub fn with_config(config: EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self {
            storages: HashMap::new(),
            config,
        })
    }

    /// Allocation settings applied to new storages.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }

    /// Ensures a storage for `T` exists and returns it.
    ///
    /// Registering a type twice keeps the existing storage and its contents.
    pub fn register<T: Component>(&mut self) -> &mut SparseSet<T> {
        let config = self.config;
        let storage = self
            .storages
            .entry(ComponentKey::of::<T>())
            .or_insert_with(|| {
                tracing::debug!(component = std::any::type_name::<T>(), "creating sparse set");
                Box::new(SparseSet::<T>::with_config(config))
            });
        downcast_mut(storage.as_mut())
    }

    /// Checks if a storage for `T` exists.
    #[inline]
    #[must_use]
    pub fn is_registered<T: Component>(&self) -> bool {
        self.storages.contains_key(&ComponentKey::of::<T>())
    }

    /// Attaches `value` to `entity`, creating the storage for `T` if needed.
    ///
    /// Returns the previous value if the entity already held a `T`.
    pub fn emplace<T: Component>(&mut self, entity: Entity, value: T) -> Option<T> {
        self.register::<T>().emplace(entity, value)
    }

    /// Returns the `T` attached to `entity`.
    ///
    /// `None` if the entity has no `T` or no `T` was ever registered.
    #[inline]
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Returns the `T` attached to `entity` mutably.
    #[inline]
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Checks if `entity` holds a `T`.
    #[inline]
    #[must_use]
    pub fn contains<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>()
            .is_some_and(|storage| storage.contains(entity))
    }

    /// Detaches and returns the `T` attached to `entity`.
    ///
    /// A no-op returning `None` if no storage for `T` exists.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Detaches every component from `entity`.
    ///
    /// The handle itself stays valid and may be given new components.
    /// Returns the number of components removed.
    pub fn remove_all(&mut self, entity: Entity) -> usize {
        self.storages
            .values_mut()
            .map(|storage| usize::from(storage.remove_erased(entity)))
            .sum()
    }

    /// Returns the storage for `T`, if registered.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&ComponentKey::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Returns the storage for `T` mutably, if registered.
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.storages
            .get_mut(&ComponentKey::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<SparseSet<T>>())
    }

    /// Returns the type-erased storage for `key`, if registered.
    #[must_use]
    pub fn erased_storage(&self, key: ComponentKey) -> Option<&dyn ErasedStorage> {
        self.storages.get(&key).map(|storage| &**storage)
    }

    /// Number of entities holding a `T`. Zero if `T` is unregistered.
    #[must_use]
    pub fn count<T: Component>(&self) -> usize {
        self.storage::<T>().map_or(0, SparseSet::len)
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    /// Keys of every registered component type, in no particular order.
    pub fn component_keys(&self) -> impl Iterator<Item = ComponentKey> + '_ {
        self.storages.keys().copied()
    }

    /// Drops every component. Storages stay registered.
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }
    }
}

/// Recovers the concrete set behind a storage found under `T`'s key.
pub(crate) fn downcast_mut<T: Component>(storage: &mut dyn ErasedStorage) -> &mut SparseSet<T> {
    let key = storage.key();
    match storage.as_any_mut().downcast_mut::<SparseSet<T>>() {
        Some(set) => set,
        None => unreachable!(
            "storage for {key} found under the key of {}",
            std::any::type_name::<T>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::EntityAllocator;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        dx: f32,
    }

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert_eq!(registry.storage_count(), 0);
        assert_eq!(registry.config(), &EcsConfig::default());
    }

    #[test]
    fn test_emplace_creates_storage_lazily() {
        let mut registry = Registry::new();
        let e = Entity::from_raw(0);

        assert!(!registry.is_registered::<Position>());
        registry.emplace(e, Position { x: 1.0 });
        assert!(registry.is_registered::<Position>());
        assert_eq!(registry.storage_count(), 1);
        assert_eq!(registry.get::<Position>(e), Some(&Position { x: 1.0 }));
    }

    #[test]
    fn test_get_unregistered_is_none() {
        let registry = Registry::new();
        assert!(registry.get::<Position>(Entity::from_raw(0)).is_none());
        assert!(!registry.contains::<Position>(Entity::from_raw(0)));
        assert_eq!(registry.count::<Position>(), 0);
    }

    #[test]
    fn test_remove_unregistered_is_noop() {
        let mut registry = Registry::new();
        assert_eq!(registry.remove::<Velocity>(Entity::from_raw(3)), None);
        assert!(!registry.is_registered::<Velocity>());
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = Registry::new();
        let e = Entity::from_raw(2);

        assert!(registry.register::<Position>().is_empty());
        registry.emplace(e, Position { x: 5.0 });
        assert_eq!(registry.register::<Position>().len(), 1);
        assert_eq!(registry.get::<Position>(e), Some(&Position { x: 5.0 }));
    }

    #[test]
    fn test_get_mut_and_overwrite() {
        let mut registry = Registry::new();
        let e = Entity::from_raw(1);

        registry.emplace(e, Velocity { dx: 1.0 });
        if let Some(vel) = registry.get_mut::<Velocity>(e) {
            vel.dx = 3.0;
        }
        assert_eq!(registry.emplace(e, Velocity { dx: 4.0 }), Some(Velocity { dx: 3.0 }));
        assert_eq!(registry.count::<Velocity>(), 1);
    }

    #[test]
    fn test_same_type_resolves_same_storage() {
        let mut registry = Registry::new();
        let mut entities = EntityAllocator::new();
        let a = entities.create();
        let b = entities.create();

        registry.emplace(a, 1u32);
        registry.emplace(b, 2u32);
        assert_eq!(registry.storage_count(), 1);
        assert_eq!(registry.storage::<u32>().map(SparseSet::len), Some(2));
    }

    #[test]
    fn test_remove_all() {
        let mut registry = Registry::new();
        let e = Entity::from_raw(4);
        let other = Entity::from_raw(5);

        registry.emplace(e, Position { x: 0.0 });
        registry.emplace(e, Velocity { dx: 0.0 });
        registry.emplace(other, Position { x: 1.0 });

        assert_eq!(registry.remove_all(e), 2);
        assert!(!registry.contains::<Position>(e));
        assert!(!registry.contains::<Velocity>(e));
        assert!(registry.contains::<Position>(other));
        assert_eq!(registry.remove_all(e), 0);
    }

    #[test]
    fn test_clear_keeps_registration() {
        let mut registry = Registry::new();
        registry.emplace(Entity::from_raw(0), Position { x: 0.0 });
        registry.clear();

        assert!(registry.is_registered::<Position>());
        assert_eq!(registry.count::<Position>(), 0);
    }

    #[test]
    fn test_with_config_applies_to_storages() {
        let config = EcsConfig {
            sparse_block_size: 8,
            dense_capacity: 4,
        };
        let mut registry = Registry::with_config(config).unwrap();
        assert_eq!(registry.register::<Position>().sparse_capacity(), 8);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = EcsConfig {
            sparse_block_size: 0,
            dense_capacity: 0,
        };
        assert!(Registry::with_config(config).is_err());
    }

    #[test]
    fn test_erased_storage_lookup() {
        let mut registry = Registry::new();
        registry.emplace(Entity::from_raw(9), Position { x: 0.0 });

        let storage = registry
            .erased_storage(ComponentKey::of::<Position>())
            .unwrap();
        assert_eq!(storage.dense(), &[Entity::from_raw(9)]);
        assert!(registry.erased_storage(ComponentKey::of::<Velocity>()).is_none());
        assert_eq!(registry.component_keys().count(), 1);
    }
}
