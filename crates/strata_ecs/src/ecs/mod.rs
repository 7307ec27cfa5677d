//! # Entity Component System
//!
//! A sparse-set ECS: one [`SparseSet`] per component type, owned by a
//! [`Registry`].
//!
//! ## Design Philosophy
//!
//! - Entity handles are plain integers and are never reused
//! - Components of one type are packed in a dense array for iteration
//! - Membership and lookup go through a sparse index, so both are O(1)
//! - Multi-component iteration is driven by the smallest storage

mod component;
mod dynamic;
mod entity;
mod query;
mod registry;
mod sparse_set;

pub use component::{Component, ComponentKey};
pub use dynamic::{DynamicArgs, DynamicVisitor, IntoDynamicVisitor, Param, Signature};
pub use entity::{Entity, EntityAllocator};
pub use registry::Registry;
pub use sparse_set::{ErasedStorage, SparseSet};
