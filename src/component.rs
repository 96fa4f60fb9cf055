// Copyright 2025 Lattice ECS Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Component traits and the per-type column registry
//!
//! Components are plain data attached to entities. The registry owns one
//! dense [`Column`] per registered type and dispatches typed operations
//! through the type's signature.

use std::any::TypeId;

use smallvec::{smallvec, SmallVec};
use tracing::{debug, warn};

use crate::archetype::Archetype;
use crate::column::{AnyColumn, Column};
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::signature::{Signature, SignatureRegistry, ERROR_SIGNATURE, MAX_SIGNATURES};

/// Maximum number of component types in a [`ComponentSet`] tuple
pub const MAX_SET_COMPONENTS: usize = 8;

/// Marker trait for components
///
/// Components must own their data and be clonable; cloning backs the
/// deep-copy assignment mode of columns and registries.
pub trait Component: Clone + Send + Sync + 'static {}

/// Automatically implement Component for all valid types
impl<T: Clone + Send + Sync + 'static> Component for T {}

/// Static list of component types
///
/// Implemented for tuples of 1 to 8 component types; stands in wherever
/// an operation is parameterized over a set of types (archetype lookup,
/// query registration, buffer setup).
pub trait ComponentSet: 'static {
    /// Type ids of the member components, in tuple order
    fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]>;

    /// Register every member type with `registry`
    fn register_all(registry: &mut ComponentRegistry);
}

macro_rules! impl_component_set {
    ($($T:ident),*) => {
        impl<$($T: Component),*> ComponentSet for ($($T,)*) {
            fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]> {
                smallvec![$(TypeId::of::<$T>()),*]
            }

            fn register_all(registry: &mut ComponentRegistry) {
                $(registry.register::<$T>();)*
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Owns one column per registered component type
///
/// Columns are indexed by signature. A column, once created, lives until
/// the registry is released or replaced; clearing empties every column
/// but preserves registrations.
pub struct ComponentRegistry {
    capacity: usize,
    signatures: SignatureRegistry,
    columns: Vec<Option<Box<dyn AnyColumn>>>,
}

impl ComponentRegistry {
    /// Create a registry whose columns each hold up to `capacity` values
    pub fn new(capacity: usize) -> Self {
        let mut columns = Vec::with_capacity(MAX_SIGNATURES);
        columns.resize_with(MAX_SIGNATURES, || None);

        Self {
            capacity,
            signatures: SignatureRegistry::new(),
            columns,
        }
    }

    /// Register a component type and allocate its column
    ///
    /// Idempotent. Returns [`ERROR_SIGNATURE`] when the signature space
    /// is saturated.
    pub fn register<T: Component>(&mut self) -> Signature {
        let signature = self.signatures.register::<T>();
        if signature == ERROR_SIGNATURE {
            warn!("cannot allocate a column, signature space saturated");
            return ERROR_SIGNATURE;
        }

        let slot = &mut self.columns[signature as usize];
        if slot.is_none() {
            *slot = Some(Box::new(Column::<T>::new(self.capacity)));
        }
        signature
    }

    /// Signature of a registered type, or [`ERROR_SIGNATURE`]
    pub fn signature_of<T: 'static>(&self) -> Signature {
        self.signatures.signature_of::<T>()
    }

    /// Signature lookup by raw type id
    pub fn signature_of_type_id(&self, type_id: TypeId) -> Signature {
        self.signatures.signature_of_type_id(type_id)
    }

    /// Archetype covering every registered member of `S`
    ///
    /// Unregistered members contribute no bits.
    pub fn archetype_of<S: ComponentSet>(&self) -> Archetype {
        let mut archetype = Archetype::new();
        for type_id in S::type_ids() {
            archetype.merge_signature(self.signatures.signature_of_type_id(type_id));
        }
        archetype
    }

    /// Number of registered component types
    pub fn num_signatures(&self) -> usize {
        self.signatures.len()
    }

    /// Typed view of a column
    pub fn column<T: Component>(&self) -> Option<&Column<T>> {
        let signature = self.signatures.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return None;
        }

        self.columns[signature as usize]
            .as_ref()?
            .as_any()
            .downcast_ref::<Column<T>>()
    }

    /// Mutable typed view of a column
    pub fn column_mut<T: Component>(&mut self) -> Option<&mut Column<T>> {
        let signature = self.signatures.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return None;
        }

        self.columns[signature as usize]
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<Column<T>>()
    }

    /// Store a component value under an entity id
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<Entity> {
        let Some(column) = self.column_mut::<T>() else {
            debug!(%entity, "insert into an unregistered component type");
            return Err(EcsError::UnknownComponent(TypeId::of::<T>()));
        };

        column.insert(entity, value)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.column::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.column_mut::<T>()?.get_mut(entity)
    }

    /// Remove one component type from an entity; no-op when absent
    pub fn remove<T: Component>(&mut self, entity: Entity) {
        if let Some(column) = self.column_mut::<T>() {
            column.remove(entity);
        }
    }

    /// Remove every component carried by `entity`
    ///
    /// Component ids are entity ids, so this runs when an entity dies.
    pub fn remove_all(&mut self, entity: Entity) {
        for column in self.columns.iter_mut().flatten() {
            column.remove(entity);
        }
    }

    /// Ids carrying a component of type `T`, in column slot order
    pub fn component_entities<T: Component>(&self) -> Vec<Entity> {
        match self.column::<T>() {
            Some(column) => column.ids().to_vec(),
            None => Vec::new(),
        }
    }

    /// Empty every column; registrations are preserved
    pub fn clear(&mut self) {
        for column in self.columns.iter_mut().flatten() {
            column.clear();
        }
    }

    /// Take ownership of `other`'s column storage
    ///
    /// The source keeps its registrations but loses its storage; typed
    /// operations on it fail softly until it is rebuilt.
    pub fn move_from(&mut self, other: &mut ComponentRegistry) {
        self.capacity = other.capacity;
        self.signatures = other.signatures.clone();
        for (mine, theirs) in self.columns.iter_mut().zip(other.columns.iter_mut()) {
            *mine = theirs.take();
        }
    }

    /// Become a deep copy of `other`; the source is untouched
    pub fn copy_from(&mut self, other: &ComponentRegistry) {
        self.capacity = other.capacity;
        self.signatures = other.signatures.clone();
        for (mine, theirs) in self.columns.iter_mut().zip(other.columns.iter()) {
            *mine = theirs.as_ref().map(|column| column.clone_boxed());
        }
    }

    /// Drop all column storage in place, keeping registrations
    pub fn release(&mut self) {
        for column in &mut self.columns {
            *column = None;
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Clone for ComponentRegistry {
    fn clone(&self) -> Self {
        let mut copy = ComponentRegistry::new(self.capacity);
        copy.copy_from(self);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Mass(f64);

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Charge(f64);

    #[test]
    fn register_and_dispatch() {
        let mut registry = ComponentRegistry::new(16);

        let mass_sig = registry.register::<Mass>();
        let charge_sig = registry.register::<Charge>();
        assert_ne!(mass_sig, charge_sig);
        assert_eq!(registry.register::<Mass>(), mass_sig);
        assert_eq!(registry.num_signatures(), 2);

        registry.insert(Entity(4), Mass(2.0)).unwrap();
        registry.insert(Entity(4), Charge(-1.0)).unwrap();

        assert_eq!(registry.get::<Mass>(Entity(4)), Some(&Mass(2.0)));
        assert_eq!(registry.get::<Charge>(Entity(4)), Some(&Charge(-1.0)));

        registry.remove::<Mass>(Entity(4));
        assert_eq!(registry.get::<Mass>(Entity(4)), None);
        assert_eq!(registry.get::<Charge>(Entity(4)), Some(&Charge(-1.0)));
    }

    #[test]
    fn unregistered_type_fails_softly() {
        let mut registry = ComponentRegistry::new(16);

        let err = registry.insert(Entity(0), Mass(1.0)).unwrap_err();
        assert!(matches!(err, EcsError::UnknownComponent(_)));
        assert_eq!(registry.get::<Mass>(Entity(0)), None);
        registry.remove::<Mass>(Entity(0)); // no-op, no panic
    }

    #[test]
    fn remove_all_sweeps_every_column() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Mass>();
        registry.register::<Charge>();

        registry.insert(Entity(1), Mass(1.0)).unwrap();
        registry.insert(Entity(1), Charge(2.0)).unwrap();
        registry.insert(Entity(2), Mass(3.0)).unwrap();

        registry.remove_all(Entity(1));

        assert_eq!(registry.get::<Mass>(Entity(1)), None);
        assert_eq!(registry.get::<Charge>(Entity(1)), None);
        assert_eq!(registry.get::<Mass>(Entity(2)), Some(&Mass(3.0)));
    }

    #[test]
    fn clear_preserves_registrations() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Mass>();
        registry.insert(Entity(0), Mass(1.0)).unwrap();

        registry.clear();

        assert_eq!(registry.get::<Mass>(Entity(0)), None);
        assert_ne!(registry.signature_of::<Mass>(), ERROR_SIGNATURE);
        assert!(registry.insert(Entity(0), Mass(2.0)).is_ok());
    }

    #[test]
    fn component_set_type_ids() {
        let ids = <(Mass, Charge)>::type_ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], TypeId::of::<Mass>());
        assert_eq!(ids[1], TypeId::of::<Charge>());
    }

    #[test]
    fn archetype_of_skips_unregistered_members() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Mass>();

        let archetype = registry.archetype_of::<(Mass, Charge)>();
        assert_eq!(archetype.count(), 1);
        assert!(archetype.supports_signature(registry.signature_of::<Mass>()));
    }

    #[test]
    fn move_from_transfers_storage() {
        let mut source = ComponentRegistry::new(16);
        source.register::<Mass>();
        source.insert(Entity(7), Mass(7.0)).unwrap();

        let mut destination = ComponentRegistry::new(4);
        destination.move_from(&mut source);

        assert_eq!(destination.get::<Mass>(Entity(7)), Some(&Mass(7.0)));
        assert_eq!(destination.capacity(), 16);

        // Source stays registered but has no storage
        assert_ne!(source.signature_of::<Mass>(), ERROR_SIGNATURE);
        assert_eq!(source.get::<Mass>(Entity(7)), None);
        assert!(source.insert(Entity(0), Mass(0.0)).is_err());
    }

    #[test]
    fn columns_fill_to_capacity_independently() {
        let capacity = 50;
        let mut registry = ComponentRegistry::new(capacity);
        registry.register::<Mass>();
        registry.register::<Charge>();

        for id in 0..capacity as i64 {
            assert!(registry.insert(Entity(id), Mass(id as f64)).is_ok());
            assert!(registry.insert(Entity(id), Charge(-(id as f64))).is_ok());
        }

        // Both columns are full; one more of either type fails
        assert_eq!(
            registry.insert(Entity(capacity as i64), Mass(0.0)),
            Err(EcsError::CapacityExceeded)
        );
        assert_eq!(
            registry.insert(Entity(capacity as i64), Charge(0.0)),
            Err(EcsError::CapacityExceeded)
        );

        // Freeing one type's slot does not free the other's
        registry.remove::<Mass>(Entity(0));
        assert!(registry.insert(Entity(capacity as i64), Mass(1.0)).is_ok());
        assert_eq!(
            registry.insert(Entity(capacity as i64), Charge(0.0)),
            Err(EcsError::CapacityExceeded)
        );
    }

    #[test]
    fn component_entities_track_addition_and_deletion() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Mass>();

        assert!(registry.component_entities::<Charge>().is_empty());
        assert!(registry.component_entities::<Mass>().is_empty());

        for id in 0..8 {
            registry.insert(Entity(id), Mass(id as f64)).unwrap();
        }
        registry.remove::<Mass>(Entity(3));
        registry.remove::<Mass>(Entity(7));

        let mut ids = registry.component_entities::<Mass>();
        ids.sort();
        let expected: Vec<Entity> = [0, 1, 2, 4, 5, 6].iter().map(|&id| Entity(id)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn move_from_discards_destination_contents() {
        let mut source = ComponentRegistry::new(8);
        source.register::<Mass>();
        source.insert(Entity(0), Mass(1.0)).unwrap();

        let mut destination = ComponentRegistry::new(8);
        destination.register::<Mass>();
        destination.register::<Charge>();
        destination.insert(Entity(5), Mass(5.0)).unwrap();
        destination.insert(Entity(5), Charge(5.0)).unwrap();

        destination.move_from(&mut source);

        // Destination mirrors the source exactly: its old values and its
        // extra registration are gone.
        assert_eq!(destination.get::<Mass>(Entity(0)), Some(&Mass(1.0)));
        assert_eq!(destination.get::<Mass>(Entity(5)), None);
        assert_eq!(destination.signature_of::<Charge>(), ERROR_SIGNATURE);
        assert_eq!(destination.num_signatures(), 1);
    }

    #[test]
    fn clear_on_empty_registry_is_harmless() {
        let mut registry = ComponentRegistry::new(4);
        registry.clear();
        assert_eq!(registry.num_signatures(), 0);

        registry.register::<Mass>();
        registry.clear();
        assert!(registry.insert(Entity(0), Mass(1.0)).is_ok());
    }

    #[test]
    fn copy_from_is_deep_and_release_drops_storage() {
        let mut source = ComponentRegistry::new(16);
        source.register::<Mass>();
        source.register::<Charge>();
        source.insert(Entity(1), Mass(1.0)).unwrap();
        source.insert(Entity(2), Charge(2.0)).unwrap();

        let mut destination = ComponentRegistry::new(16);
        destination.copy_from(&source);

        assert_eq!(destination.get::<Mass>(Entity(1)), Some(&Mass(1.0)));
        assert_eq!(destination.get::<Charge>(Entity(2)), Some(&Charge(2.0)));

        // Independence in both directions
        destination.get_mut::<Mass>(Entity(1)).unwrap().0 = 10.0;
        assert_eq!(source.get::<Mass>(Entity(1)), Some(&Mass(1.0)));

        source.release();
        assert_eq!(source.get::<Mass>(Entity(1)), None);
        assert_eq!(destination.get::<Mass>(Entity(1)), Some(&Mass(10.0)));
    }
}
