//! # Typed Iteration
//!
//! Fixed-arity joins over two to four component types.
//!
//! The storage with the fewest entities drives the loop; every other
//! storage is probed by entity. Entities missing any requested component are
//! skipped. Visitation follows the driving storage's dense order, which is
//! not stable across removals.

use super::component::{first_duplicate, Component, ComponentKey};
use super::entity::Entity;
use super::registry::{downcast_mut, Registry};
use crate::error::EcsError;

/// Panics if the same component type is requested twice.
///
/// Two mutable borrows of one storage cannot coexist, so this is a contract
/// violation rather than an empty result.
fn assert_distinct(keys: &[ComponentKey]) {
    if let Some(key) = first_duplicate(keys) {
        panic!("{}", EcsError::DuplicateComponent { name: key.name() });
    }
}

/// Index of the first shortest length.
fn shortest(lens: &[usize]) -> usize {
    let mut driver = 0;
    for (i, &len) in lens.iter().enumerate().skip(1) {
        if len < lens[driver] {
            driver = i;
        }
    }
    driver
}

macro_rules! impl_iterate {
    ($(#[$meta:meta])* $name:ident; $($ty:ident => $set:ident, $val:ident);+) => {
        $(#[$meta])*
        ///
        /// Returns the number of entities visited. If any requested type was
        /// never registered, nothing is visited.
        ///
        /// # Panics
        ///
        /// Panics if the same component type is requested more than once.
        pub fn $name<$($ty: Component,)+ F>(&mut self, mut visit: F) -> usize
        where
            F: FnMut(Entity, $(&mut $ty),+),
        {
            let keys = [$(ComponentKey::of::<$ty>()),+];
            assert_distinct(&keys);

            let [$(Some($set)),+] = self.storages.get_disjoint_mut(keys.each_ref()) else {
                return 0;
            };
            $(let $set = downcast_mut::<$ty>($set.as_mut());)+

            let driver = shortest(&[$($set.len()),+]);
            let count = [$($set.len()),+][driver];

            let mut visited = 0;
            for i in 0..count {
                let entity = [$($set.dense()),+][driver][i];
                if let ($(Some($val),)+) = ($($set.get_mut(entity),)+) {
                    visit(entity, $($val),+);
                    visited += 1;
                }
            }
            visited
        }
    };
}

impl Registry {
    impl_iterate! {
        /// Visits every entity holding both `A` and `B`.
        iterate2;
        A => a_set, a;
        B => b_set, b
    }

    impl_iterate! {
        /// Visits every entity holding `A`, `B` and `C`.
        iterate3;
        A => a_set, a;
        B => b_set, b;
        C => c_set, c
    }

    impl_iterate! {
        /// Visits every entity holding `A`, `B`, `C` and `D`.
        iterate4;
        A => a_set, a;
        B => b_set, b;
        C => c_set, c;
        D => d_set, d
    }
}
