//! # Dynamic Iteration
//!
//! Iteration over a component set chosen at run time.
//!
//! A [`DynamicVisitor`] pairs a [`Signature`] (the ordered parameter list
//! `(Entity, C1, .., Ck)`) with a type-erased callback. The registry resolves
//! one storage per declared component, then runs the same shortest-driver
//! join as the typed helpers, handing the callback a [`DynamicArgs`] slot
//! list instead of statically bound references.
//!
//! ## Cost
//!
//! Every visited entity costs a storage scan, a small allocation for the
//! argument list and one `Any` downcast per component. Prefer
//! [`Registry::iterate2`] and friends on hot paths; use this where the
//! arity is only known at run time.
//!
//! ## Example
//!
//! ```
//! use strata_ecs::{DynamicVisitor, Entity, Registry, Signature};
//!
//! struct Health(u32);
//! struct Poison(u32);
//!
//! let mut registry = Registry::new();
//! let e = Entity::from_raw(0);
//! registry.emplace(e, Health(10));
//! registry.emplace(e, Poison(3));
//!
//! // Closure form: the signature is read from the parameter types.
//! registry.iterate_dynamic(|_: Entity, hp: &mut Health, poison: &mut Poison| {
//!     hp.0 -= poison.0;
//! });
//!
//! // Descriptor form: the signature is assembled explicitly.
//! let signature = Signature::new().entity().component::<Health>();
//! registry.iterate_dynamic(DynamicVisitor::new(signature, |_, args| {
//!     if let Some(hp) = args.get::<Health>(0) {
//!         hp.0 += 1;
//!     }
//! }));
//!
//! assert_eq!(registry.get::<Health>(e).map(|h| h.0), Some(8));
//! ```

use std::any::Any;

use super::component::{first_duplicate, Component, ComponentKey};
use super::entity::Entity;
use super::registry::Registry;
use super::sparse_set::ErasedStorage;
use crate::error::{EcsError, EcsResult};

/// One declared parameter of a dynamic visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    /// The entity handle.
    Entity,
    /// A mutable reference to a component of the given type.
    Component(ComponentKey),
}

/// Ordered parameter list of a dynamic visitor.
///
/// Well-formed signatures start with [`Param::Entity`] and declare at least
/// one component after it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Creates an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity handle parameter.
    #[must_use]
    pub fn entity(mut self) -> Self {
        self.params.push(Param::Entity);
        self
    }

    /// Appends a component parameter of type `C`.
    #[must_use]
    pub fn component<C: Component>(self) -> Self {
        self.with_key(ComponentKey::of::<C>())
    }

    /// Appends a component parameter by key.
    #[must_use]
    pub fn with_key(mut self, key: ComponentKey) -> Self {
        self.params.push(Param::Component(key));
        self
    }

    /// The declared parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Checks the signature shape and returns the component keys in order.
    ///
    /// # Errors
    ///
    /// - [`EcsError::MissingEntityParam`] if the first parameter is not the
    ///   entity handle.
    /// - [`EcsError::UnexpectedEntityParam`] if the handle appears again.
    /// - [`EcsError::NoComponentParams`] if no component is declared.
    /// - [`EcsError::DuplicateComponent`] if a component type repeats.
    pub fn validate(&self) -> EcsResult<Vec<ComponentKey>> {
        let Some((Param::Entity, rest)) = self.params.split_first() else {
            return Err(EcsError::MissingEntityParam);
        };

        let mut keys = Vec::with_capacity(rest.len());
        for (offset, param) in rest.iter().enumerate() {
            match param {
                Param::Entity => {
                    return Err(EcsError::UnexpectedEntityParam {
                        position: offset + 1,
                    })
                }
                Param::Component(key) => keys.push(*key),
            }
        }

        if keys.is_empty() {
            return Err(EcsError::NoComponentParams);
        }
        if let Some(key) = first_duplicate(&keys) {
            return Err(EcsError::DuplicateComponent { name: key.name() });
        }
        Ok(keys)
    }
}

/// Component arguments for one visited entity.
///
/// Slot `i` holds the component declared at signature position `i + 1`
/// (position 0 is the entity handle, passed separately).
pub struct DynamicArgs<'a> {
    keys: &'a [ComponentKey],
    slots: Vec<Option<&'a mut dyn Any>>,
    cursor: usize,
}

impl<'a> DynamicArgs<'a> {
    /// Number of component slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if there are no component slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Component type declared for slot `index`.
    #[must_use]
    pub fn key(&self, index: usize) -> Option<ComponentKey> {
        self.keys.get(index).copied()
    }

    /// Borrows slot `index` as a `C`.
    ///
    /// `None` if the slot is out of range, was taken, or holds another type.
    pub fn get<C: Component>(&mut self, index: usize) -> Option<&mut C> {
        self.slots.get_mut(index)?.as_deref_mut()?.downcast_mut::<C>()
    }

    /// Borrows slot `index` as `Any`.
    pub fn get_any(&mut self, index: usize) -> Option<&mut dyn Any> {
        self.slots.get_mut(index)?.as_deref_mut()
    }

    /// Moves slot `index` out as a `C`, for the full visit.
    ///
    /// Unlike [`get`](Self::get), several taken slots can be held at once.
    /// A slot of another type is left in place.
    pub fn take<C: Component>(&mut self, index: usize) -> Option<&'a mut C> {
        let slot = self.slots.get_mut(index)?;
        if !slot.as_deref().is_some_and(|value| value.is::<C>()) {
            return None;
        }
        slot.take()?.downcast_mut::<C>()
    }

    /// Takes the next slot in declaration order.
    fn take_next<C: Component>(&mut self) -> Option<&'a mut C> {
        let index = self.cursor;
        self.cursor += 1;
        self.take(index)
    }
}

type Callback<'f> = Box<dyn FnMut(Entity, &mut DynamicArgs<'_>) + 'f>;

/// A run-time described visitor.
pub struct DynamicVisitor<'f> {
    signature: Signature,
    callback: Callback<'f>,
}

impl<'f> DynamicVisitor<'f> {
    /// Pairs a signature with a callback.
    ///
    /// The signature is only checked when the visitor is run.
    pub fn new<F>(signature: Signature, callback: F) -> Self
    where
        F: FnMut(Entity, &mut DynamicArgs<'_>) + 'f,
    {
        Self {
            signature,
            callback: Box::new(callback),
        }
    }

    /// The declared parameters.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Conversion into a [`DynamicVisitor`].
///
/// Implemented for `DynamicVisitor` itself and for closures of the shape
/// `FnMut(Entity, &mut C1, .., &mut Ck)` with `k` from 1 to 6, whose
/// signature is derived from the parameter types.
pub trait IntoDynamicVisitor<'f, Marker> {
    /// Performs the conversion.
    fn into_visitor(self) -> DynamicVisitor<'f>;
}

impl<'f> IntoDynamicVisitor<'f, ()> for DynamicVisitor<'f> {
    fn into_visitor(self) -> DynamicVisitor<'f> {
        self
    }
}

macro_rules! impl_into_visitor {
    ($($ty:ident),+) => {
        impl<'f, F, $($ty: Component),+> IntoDynamicVisitor<'f, fn(Entity, $(&mut $ty),+)> for F
        where
            F: FnMut(Entity, $(&mut $ty),+) + 'f,
        {
            fn into_visitor(mut self) -> DynamicVisitor<'f> {
                let signature = Signature::new().entity()$(.component::<$ty>())+;
                DynamicVisitor::new(signature, move |entity, args| {
                    #[allow(non_snake_case)]
                    let ($(Some($ty),)+) = ($(args.take_next::<$ty>(),)+) else {
                        return;
                    };
                    self(entity, $($ty),+);
                })
            }
        }
    };
}

impl_into_visitor!(A);
impl_into_visitor!(A, B);
impl_into_visitor!(A, B, C);
impl_into_visitor!(A, B, C, D);
impl_into_visitor!(A, B, C, D, E);
impl_into_visitor!(A, B, C, D, E, G);

impl Registry {
    /// Visits every entity holding all components a run-time visitor
    /// declares.
    ///
    /// Accepts either a closure `FnMut(Entity, &mut C1, .., &mut Ck)` or an
    /// explicit [`DynamicVisitor`]. Returns the number of entities visited;
    /// zero if any declared type was never registered.
    ///
    /// Markedly slower per entity than the typed helpers, since every visit
    /// allocates an argument list and downcasts each component.
    ///
    /// # Panics
    ///
    /// Panics if the signature is malformed (see [`Signature::validate`]).
    pub fn iterate_dynamic<'f, M>(&mut self, visitor: impl IntoDynamicVisitor<'f, M>) -> usize {
        match self.try_iterate_dynamic(visitor) {
            Ok(visited) => visited,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`iterate_dynamic`](Self::iterate_dynamic), but reports a
    /// malformed signature as an error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Signature::validate`].
    pub fn try_iterate_dynamic<'f, M>(
        &mut self,
        visitor: impl IntoDynamicVisitor<'f, M>,
    ) -> EcsResult<usize> {
        let DynamicVisitor {
            signature,
            mut callback,
        } = visitor.into_visitor();
        let keys = signature.validate()?;

        let mut resolved: Vec<Option<&mut Box<dyn ErasedStorage>>> =
            keys.iter().map(|_| None).collect();
        for (key, storage) in &mut self.storages {
            if let Some(position) = keys.iter().position(|k| k == key) {
                resolved[position] = Some(storage);
            }
        }
        let Some(mut storages) = resolved.into_iter().collect::<Option<Vec<_>>>() else {
            tracing::trace!(?keys, "dynamic iteration skipped: storage missing");
            return Ok(0);
        };

        let lens: Vec<usize> = storages.iter().map(|storage| storage.len()).collect();
        let driver = lens
            .iter()
            .enumerate()
            .min_by_key(|&(_, len)| len)
            .map_or(0, |(i, _)| i);

        let mut visited = 0;
        for i in 0..lens[driver] {
            let entity = storages[driver].dense()[i];
            if !storages.iter().all(|storage| storage.contains(entity)) {
                continue;
            }

            let slots: Vec<Option<&mut dyn Any>> = storages
                .iter_mut()
                .map(|storage| storage.get_erased_mut(entity))
                .collect();
            let mut args = DynamicArgs {
                keys: &keys,
                slots,
                cursor: 0,
            };
            callback(entity, &mut args);
            visited += 1;
        }
        Ok(visited)
    }
}
