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

//! World: the public facade over entities, components, queries, systems
//!
//! Every mutating call maintains the same internal order: write the
//! component column first, then the entity's archetype, then the query
//! index. A reader walking a query set therefore never sees an entity
//! whose archetype advertises a component that has not been stored yet.

use ahash::AHashSet;
use tracing::{debug, warn};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::Archetype;
use crate::buffer::EntityComponentBuffer;
use crate::column::Column;
use crate::component::{Component, ComponentRegistry, ComponentSet};
use crate::edge::Edge;
use crate::entity::{Entity, EntityPool};
use crate::error::{EcsError, Result};
use crate::query::{QueryId, QueryIndex};
use crate::signature::{Signature, ERROR_SIGNATURE};
use crate::system::{System, SystemRegistry};

/// Default maximum number of simultaneous entities
pub const DEFAULT_MAX_ENTITIES: usize = 20_000;

/// Central ECS container
///
/// Owns the entity pool, the component columns, the query index, and the
/// system registry. The built-in [`Edge`] component and its query are
/// registered at construction.
pub struct World {
    max_entities: usize,
    entities: EntityPool,
    components: ComponentRegistry,
    queries: QueryIndex,
    systems: SystemRegistry,
    edge_query: QueryId,
}

impl World {
    /// World with the default entity capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTITIES)
    }

    /// World holding at most `max_entities` simultaneous entities
    pub fn with_capacity(max_entities: usize) -> Self {
        let entities = EntityPool::new(max_entities);
        let max_entities = entities.capacity();

        let mut world = Self {
            max_entities,
            entities,
            components: ComponentRegistry::new(max_entities),
            queries: QueryIndex::new(),
            systems: SystemRegistry::new(),
            edge_query: QueryId::INVALID,
        };

        world.register_component::<Edge>();
        world.edge_query = world.add_archetype_query::<(Edge,)>();
        world
    }

    pub fn max_entities(&self) -> usize {
        self.max_entities
    }

    /// Number of active entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ---- entities -------------------------------------------------------

    /// Activate a fresh entity with an empty archetype
    ///
    /// Returns [`Entity::INVALID`] when the pool is exhausted.
    pub fn add_entity(&mut self) -> Entity {
        let entity = self.entities.add();
        if !entity.is_valid() {
            warn!("entity pool exhausted");
        }
        entity
    }

    /// Activate an edge entity connecting two nodes
    pub fn add_edge_entity(&mut self, node_a: Entity, node_b: Entity) -> Entity {
        let entity = self.add_entity();
        if !entity.is_valid() {
            return entity;
        }

        let edge = Edge::transitive(entity, node_a, node_b);
        let _ = self.add_component(entity, edge);
        entity
    }

    /// Activate an edge entity anchored only at node B
    pub fn add_terminal_edge_entity(&mut self, node_b: Entity) -> Entity {
        let entity = self.add_entity();
        if !entity.is_valid() {
            return entity;
        }

        let edge = Edge::a_terminal(entity, node_b);
        let _ = self.add_component(entity, edge);
        entity
    }

    /// Deactivate an entity
    ///
    /// All of its components are dropped, every edge referencing it as a
    /// node is rewritten, and its query memberships are cleared. Edge
    /// entities pointing at it stay alive. No-op for inactive ids.
    pub fn remove_entity(&mut self, entity: Entity) {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.remove_entity", active = self.entities.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        if !self.entities.is_active(entity) {
            return;
        }

        self.entities.remove(entity);
        self.components.remove_all(entity);
        self.detach_node_from_edges(entity);
        self.queries.remove_entity(entity);
    }

    /// Active ids in insertion order
    pub fn entities(&self) -> &[Entity] {
        self.entities.entities()
    }

    pub fn entity_active(&self, entity: Entity) -> bool {
        self.entities.is_active(entity)
    }

    /// An entity's current archetype; empty when inactive
    pub fn entity_archetype(&self, entity: Entity) -> Archetype {
        self.entities.archetype_of(entity)
    }

    // ---- components -----------------------------------------------------

    /// Register a component type for use in this world
    pub fn register_component<T: Component>(&mut self) -> Signature {
        self.components.register::<T>()
    }

    /// Archetype covering the registered members of `S`
    pub fn archetype_of<S: ComponentSet>(&self) -> Archetype {
        self.components.archetype_of::<S>()
    }

    /// Attach a component to an entity
    ///
    /// Fails when the entity is inactive, the type is unregistered, the
    /// entity already carries the type, or the column is full.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.add_component", query_count = self.queries.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        if !self.entities.is_active(entity) {
            debug!(%entity, "component add on an inactive entity");
            return Err(EcsError::InactiveEntity);
        }

        let signature = self.components.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return Err(EcsError::UnknownComponent(std::any::TypeId::of::<T>()));
        }

        let old = self.entities.archetype_of(entity);
        if old.supports_signature(signature) {
            debug!(%entity, "entity already carries this component type");
            return Err(EcsError::DuplicateComponent(std::any::TypeId::of::<T>()));
        }

        self.components.insert(entity, value)?;

        let mut new = old;
        new.merge_signature(signature);
        self.entities.set_archetype(entity, new);
        self.queries.move_entity(entity, &old, &new);
        Ok(())
    }

    /// Attach or overwrite a component
    ///
    /// Overwriting leaves the archetype and query memberships untouched.
    pub fn update_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        if !self.entities.is_active(entity) {
            debug!(%entity, "component update on an inactive entity");
            return Err(EcsError::InactiveEntity);
        }

        let signature = self.components.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return Err(EcsError::UnknownComponent(std::any::TypeId::of::<T>()));
        }

        let old = self.entities.archetype_of(entity);
        if old.supports_signature(signature) {
            match self.components.get_mut::<T>(entity) {
                Some(stored) => {
                    *stored = value;
                    return Ok(());
                }
                None => return Err(EcsError::UnknownComponent(std::any::TypeId::of::<T>())),
            }
        }

        self.components.insert(entity, value)?;

        let mut new = old;
        new.merge_signature(signature);
        self.entities.set_archetype(entity, new);
        self.queries.move_entity(entity, &old, &new);
        Ok(())
    }

    /// Read a component off an entity
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

    /// Mutable read of a component
    ///
    /// The reference stays valid until the next operation that mutates
    /// the same column.
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

    /// Column view over every value of one component type
    pub fn get_components<T: Component>(&self) -> Option<&Column<T>> {
        self.components.column::<T>()
    }

    /// Mutable column view
    pub fn get_components_mut<T: Component>(&mut self) -> Option<&mut Column<T>> {
        self.components.column_mut::<T>()
    }

    /// Number of stored values of one component type
    pub fn component_count<T: Component>(&self) -> usize {
        match self.components.column::<T>() {
            Some(column) => column.len(),
            None => 0,
        }
    }

    /// Detach a component from an entity; no-op on any failure
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        if !self.entities.is_active(entity) {
            return;
        }

        let signature = self.components.signature_of::<T>();
        if signature == ERROR_SIGNATURE {
            return;
        }

        let old = self.entities.archetype_of(entity);
        if !old.supports_signature(signature) {
            return;
        }

        self.components.remove::<T>(entity);

        let mut new = old;
        new.remove_signature(signature);
        self.entities.set_archetype(entity, new);
        self.queries.move_entity(entity, &old, &new);
    }

    // ---- edges ----------------------------------------------------------

    /// Read the edge component of an edge entity
    pub fn get_edge(&self, entity: Entity) -> Option<Edge> {
        self.get_component::<Edge>(entity).copied()
    }

    /// Rewrite both endpoints of an edge
    ///
    /// The edge id is preserved and the flag returns to transitive.
    /// `None` when the entity carries no edge component.
    pub fn update_edge(&mut self, entity: Entity, node_a: Entity, node_b: Entity) -> Option<Edge> {
        let mut edge = self.get_edge(entity)?;
        edge.node_a = node_a;
        edge.node_b = node_b;
        edge.flag = crate::edge::EdgeFlag::Transitive;

        self.update_component(entity, edge).ok()?;
        Some(edge)
    }

    /// Rewrite an edge to anchor only at node B
    pub fn update_terminal_edge(&mut self, entity: Entity, node_b: Entity) -> Option<Edge> {
        let mut edge = self.get_edge(entity)?;
        edge.node_a = Entity::INVALID;
        edge.node_b = node_b;
        edge.flag = crate::edge::EdgeFlag::ANodeTerminal;

        self.update_component(entity, edge).ok()?;
        Some(edge)
    }

    // Rewrites every edge that references a removed node.
    fn detach_node_from_edges(&mut self, node: Entity) {
        let edge_entities: Vec<Entity> = self
            .queries
            .entities(self.edge_query)
            .iter()
            .copied()
            .collect();

        for edge_entity in edge_entities {
            if let Some(edge) = self.components.get_mut::<Edge>(edge_entity) {
                edge.detach_node(node);
            }
        }
    }

    // ---- queries --------------------------------------------------------

    /// Register a query over the archetype covering `S`
    ///
    /// Returns the stable query id, or [`QueryId::INVALID`] when no
    /// member of `S` is registered.
    pub fn add_archetype_query<S: ComponentSet>(&mut self) -> QueryId {
        let archetype = self.components.archetype_of::<S>();
        if archetype.is_empty() {
            warn!("archetype query over unregistered component types");
            return QueryId::INVALID;
        }

        self.queries.add_query(archetype)
    }

    /// Entities matching a registered query
    ///
    /// Unknown ids yield an empty view.
    pub fn query_entities(&self, query: QueryId) -> &AHashSet<Entity> {
        self.queries.entities(query)
    }

    /// Entities of the query registered exactly for `archetype`
    pub fn archetype_entities(&self, archetype: &Archetype) -> &AHashSet<Entity> {
        self.queries.entities_matching(archetype)
    }

    // ---- systems --------------------------------------------------------

    /// Register a system; one instance per concrete type
    pub fn register_system<S: System + Default>(&mut self) -> Option<&mut S> {
        self.systems.register::<S>()
    }

    pub fn get_system<S: System>(&self) -> Option<&S> {
        self.systems.get::<S>()
    }

    pub fn get_system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get_mut::<S>()
    }

    /// Run the three system lifecycle phases in order
    ///
    /// Components are registered first, then queries, then every system's
    /// `initialize` runs. Update scheduling stays with the caller.
    pub fn initialize_systems(&mut self) {
        let mut systems = std::mem::take(&mut self.systems);
        systems.register_components_all(self);
        systems.register_queries_all(self);
        systems.initialize_all(self);
        self.systems = systems;
    }

    // ---- entity-component buffers ---------------------------------------

    /// Create an entity carrying a fresh buffer pre-registered for `S`
    ///
    /// Returns [`Entity::INVALID`] when the pool or the buffer column is
    /// exhausted.
    pub fn add_entity_component_buffer<S: ComponentSet>(&mut self, capacity: usize) -> Entity {
        self.register_component::<EntityComponentBuffer>();

        let entity = self.add_entity();
        if !entity.is_valid() {
            return entity;
        }

        let mut buffer = EntityComponentBuffer::new(capacity);
        buffer.register_set::<S>();

        if self.add_component(entity, buffer).is_err() {
            self.remove_entity(entity);
            return Entity::INVALID;
        }
        entity
    }

    /// Read the buffer stored on an entity
    pub fn get_entity_component_buffer(&self, entity: Entity) -> Option<&EntityComponentBuffer> {
        self.get_component::<EntityComponentBuffer>(entity)
    }

    /// Mutable read of a stored buffer
    pub fn get_entity_component_buffer_mut(
        &mut self,
        entity: Entity,
    ) -> Option<&mut EntityComponentBuffer> {
        self.get_component_mut::<EntityComponentBuffer>(entity)
    }

    // ---- maintenance ----------------------------------------------------

    /// Drop every entity and component value
    ///
    /// Component and query registrations survive; query memberships are
    /// emptied.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
        self.queries.clear_entities();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
