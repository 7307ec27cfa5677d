//! # STRATA ECS
//!
//! Sparse-set Entity Component System with typed and run-time described
//! iteration.
//!
//! ## Architecture Rules
//!
//! 1. **Handles are never reused** - [`EntityAllocator`] only counts up
//! 2. **Dense storage per type** - iteration walks packed arrays
//! 3. **Smallest set drives joins** - multi-component iteration cost scales
//!    with the rarest component
//!
//! ## Example
//!
//! ```
//! use strata_ecs::{Entity, EntityAllocator, Registry};
//!
//! struct Position(f32, f32);
//! struct Velocity(f32, f32);
//!
//! let mut entities = EntityAllocator::new();
//! let mut registry = Registry::new();
//!
//! for i in 0..4 {
//!     let e = entities.create();
//!     registry.emplace(e, Position(0.0, 0.0));
//!     if i % 2 == 0 {
//!         registry.emplace(e, Velocity(1.0, 0.5));
//!     }
//! }
//!
//! let moved = registry.iterate2::<Position, Velocity, _>(|_, pos, vel| {
//!     pos.0 += vel.0;
//!     pos.1 += vel.1;
//! });
//! assert_eq!(moved, 2);
//! assert_eq!(registry.get::<Position>(Entity::from_raw(2)).map(|p| p.0), Some(1.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::EcsConfig;
pub use ecs::{
    Component, ComponentKey, DynamicArgs, DynamicVisitor, Entity, EntityAllocator,
    ErasedStorage, IntoDynamicVisitor, Param, Registry, Signature, SparseSet,
};
pub use error::{EcsError, EcsResult};
