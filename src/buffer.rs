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

//! Entity-component buffer
//!
//! A bounded, self-contained mini container: its own entity pool and
//! component columns, no queries and no systems. Buffers are themselves
//! components, so one can live inside an outer container keyed by an
//! outer entity id and be matched by outer queries like any other type.

use tracing::{debug, warn};

use crate::component::{Component, ComponentRegistry, ComponentSet};
use crate::entity::{Entity, EntityPool};
use crate::error::{EcsError, Result};
use crate::signature::{Signature, ERROR_SIGNATURE};

/// Self-contained scratch ECS usable as a component value
#[derive(Clone)]
pub struct EntityComponentBuffer {
    capacity: usize,
    entities: EntityPool,
    components: ComponentRegistry,
    registration_locked: bool,
}

impl EntityComponentBuffer {
    /// Create a buffer holding at most `capacity` entities
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entities: EntityPool::new(capacity),
            components: ComponentRegistry::new(capacity),
            registration_locked: false,
        }
    }

    /// Register a component type
    ///
    /// Returns [`ERROR_SIGNATURE`] once registration has been locked or
    /// the signature space is saturated.
    pub fn register<T: Component>(&mut self) -> Signature {
        if self.registration_locked {
            warn!("component registration is locked on this buffer");
            return ERROR_SIGNATURE;
        }

        self.components.register::<T>()
    }

    /// Register every member of a component set
    pub fn register_set<S: ComponentSet>(&mut self) {
        if self.registration_locked {
            warn!("component registration is locked on this buffer");
            return;
        }

        S::register_all(&mut self.components);
    }

    /// Permanently disable further component-type registration
    pub fn lock_registration(&mut self) {
        self.registration_locked = true;
    }

    pub fn registration_locked(&self) -> bool {
        self.registration_locked
    }

    /// True if every member of `S` has been registered
    pub fn supports<S: ComponentSet>(&self) -> bool {
        S::type_ids()
            .iter()
            .all(|&type_id| self.components.signature_of_type_id(type_id) != ERROR_SIGNATURE)
    }

    /// Activate an entity, or [`Entity::INVALID`] past capacity
    pub fn add_entity(&mut self) -> Entity {
        self.entities.add()
    }

    /// Deactivate an entity and drop all its components
    pub fn remove_entity(&mut self, entity: Entity) {
        self.entities.remove(entity);
        self.components.remove_all(entity);
    }

    pub fn entity_active(&self, entity: Entity) -> bool {
        self.entities.is_active(entity)
    }

    /// Number of active entities
    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    /// Number of registered component types
    pub fn num_signatures(&self) -> usize {
        self.components.num_signatures()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attach a component; fails if the entity already carries the type
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        if !self.entities.is_active(entity) {
            debug!(%entity, "component add on an inactive buffer entity");
            return Err(EcsError::InactiveEntity);
        }

        let signature = self.components.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return Err(EcsError::UnknownComponent(std::any::TypeId::of::<T>()));
        }

        let mut archetype = self.entities.archetype_of(entity);
        if archetype.supports_signature(signature) {
            return Err(EcsError::DuplicateComponent(std::any::TypeId::of::<T>()));
        }

        self.components.insert(entity, value)?;
        archetype.merge_signature(signature);
        self.entities.set_archetype(entity, archetype);
        Ok(())
    }

    /// Attach or overwrite a component
    pub fn update_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        if !self.entities.is_active(entity) {
            debug!(%entity, "component update on an inactive buffer entity");
            return Err(EcsError::InactiveEntity);
        }

        let signature = self.components.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return Err(EcsError::UnknownComponent(std::any::TypeId::of::<T>()));
        }

        let mut archetype = self.entities.archetype_of(entity);
        if archetype.supports_signature(signature) {
            match self.components.get_mut::<T>(entity) {
                Some(stored) => {
                    *stored = value;
                    return Ok(());
                }
                None => return Err(EcsError::UnknownComponent(std::any::TypeId::of::<T>())),
            }
        }

        self.components.insert(entity, value)?;
        archetype.merge_signature(signature);
        self.entities.set_archetype(entity, archetype);
        Ok(())
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_active(entity) {
            return None;
        }

        let signature = self.components.signature_of::<T>();
        if !self.entities.archetype_of(entity).supports_signature(signature) {
            return None;
        }

        self.components.get::<T>(entity)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_active(entity) {
            return None;
        }

        let signature = self.components.signature_of::<T>();
        if !self.entities.archetype_of(entity).supports_signature(signature) {
            return None;
        }

        self.components.get_mut::<T>(entity)
    }

    /// Detach a component; no-op on any failure
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        if !self.entities.is_active(entity) {
            return;
        }

        let signature = self.components.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return;
        }

        let mut archetype = self.entities.archetype_of(entity);
        if !archetype.supports_signature(signature) {
            return;
        }

        self.components.remove::<T>(entity);
        archetype.remove_signature(signature);
        self.entities.set_archetype(entity, archetype);
    }

    /// Buffer entities carrying a component of type `T`
    pub fn component_entities<T: Component>(&self) -> Vec<Entity> {
        self.components.component_entities::<T>()
    }

    /// Drop all entities and component values
    ///
    /// Registrations and the registration lock survive.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
    }

    /// Take ownership of `other`'s storage
    ///
    /// The source keeps its registrations and entity bookkeeping but
    /// loses its column storage; component reads on it come back empty.
    pub fn move_from(&mut self, other: &mut EntityComponentBuffer) {
        self.capacity = other.capacity;
        self.entities = other.entities.clone();
        self.registration_locked = other.registration_locked;
        self.components.move_from(&mut other.components);
    }

    /// Become a deep, independent copy of `other`
    pub fn copy_from(&mut self, other: &EntityComponentBuffer) {
        self.capacity = other.capacity;
        self.entities = other.entities.clone();
        self.registration_locked = other.registration_locked;
        self.components.copy_from(&other.components);
    }

    /// Drop column storage in place, keeping registrations
    pub fn release(&mut self) {
        self.components.release();
    }
}
