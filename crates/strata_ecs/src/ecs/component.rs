//! # Component System
//!
//! Components are plain data owned by a sparse set. The engine never looks
//! inside them; it only needs a stable identity per type to find the right
//! storage.

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type, so any struct can be attached to an
/// entity without ceremony.
///
/// # Example
///
/// ```
/// use strata_ecs::{Component, ComponentKey};
///
/// #[derive(Debug, Default)]
/// struct Health(u32);
///
/// fn key_of<C: Component>() -> ComponentKey {
///     ComponentKey::of::<C>()
/// }
///
/// assert_eq!(key_of::<Health>(), ComponentKey::of::<Health>());
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Identity token for a component type.
///
/// Equality and hashing use the [`TypeId`] only; the type name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct ComponentKey {
    id: TypeId,
    name: &'static str,
}

impl ComponentKey {
    /// Returns the key for component type `C`.
    #[inline]
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: any::type_name::<C>(),
        }
    }

    /// The underlying type identity.
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentKey {}

impl Hash for ComponentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentKey").field(&self.name).finish()
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Returns the first component key that appears twice, if any.
pub(crate) fn first_duplicate(keys: &[ComponentKey]) -> Option<ComponentKey> {
    keys.iter()
        .enumerate()
        .find(|(i, key)| keys[..*i].contains(key))
        .map(|(_, key)| *key)
}
