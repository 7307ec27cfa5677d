//! # Entity Management
//!
//! Entities are opaque 64-bit handles. They carry no data and are never
//! recycled: the allocator hands out strictly increasing values.

use std::fmt;

/// Unique identifier for an entity.
///
/// The raw value doubles as the slot index into every sparse index, so
/// handles should come from an [`EntityAllocator`] to stay compact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Wraps a raw handle value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Slot of this entity in a sparse index.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Issues fresh entity handles.
///
/// Each call to [`create`](Self::create) returns the current counter and
/// bumps it. Handles are never reused.
///
/// # Thread Safety
///
/// The bump is a plain read-modify-write. Share one allocator across threads
/// only behind external synchronization.
///
/// # Example
///
/// ```
/// use strata_ecs::EntityAllocator;
///
/// let mut entities = EntityAllocator::new();
/// let a = entities.create();
/// let b = entities.create();
/// assert!(a < b);
/// ```
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Creates an allocator whose first handle is `Entity(0)`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a new unique entity handle.
    ///
    /// # Panics
    ///
    /// Panics if the 64-bit handle space is exhausted.
    #[inline]
    pub fn create(&mut self) -> Entity {
        let id = Entity(self.next);
        self.next = self
            .next
            .checked_add(1)
            .unwrap_or_else(|| panic!("entity handle space exhausted"));
        id
    }

    /// Returns the handle the next call to [`create`](Self::create) will
    /// produce, without consuming it.
    #[inline]
    #[must_use]
    pub const fn peek(&self) -> Entity {
        Entity(self.next)
    }

    /// Number of handles issued so far.
    #[inline]
    #[must_use]
    pub const fn allocated(&self) -> u64 {
        self.next
    }

    /// Restarts the counter at zero.
    ///
    /// Intended for deterministic tests. Handles issued before the reset
    /// will be handed out again.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}
