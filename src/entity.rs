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

//! Entity identifiers and the bounded id pool

use std::collections::VecDeque;
use std::fmt;

use tracing::warn;

use crate::archetype::Archetype;

/// Stable entity identifier
///
/// Ids are small non-negative integers handed out by an [`EntityPool`].
/// Any negative value is invalid; [`Entity::INVALID`] is the canonical
/// sentinel. An active id is never reissued until after its removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(pub i64);

impl Entity {
    /// The invalid sentinel
    pub const INVALID: Entity = Entity(-1);

    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }

    /// Index into dense per-entity tables
    ///
    /// Only meaningful for valid ids.
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::INVALID
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hard upper bound on pool capacity
///
/// Entity ids must stay encodable in 20 bits.
pub const META_MAX_ENTITIES: usize = (1 << 20) - 2;

/// Bounded pool of entity ids with per-id archetypes
///
/// Tracks a FIFO queue of free ids, an insertion-ordered list of active
/// ids, and one [`Archetype`] per id. At all times the active and free
/// counts sum to the capacity.
#[derive(Debug, Clone)]
pub struct EntityPool {
    capacity: usize,
    free: VecDeque<Entity>,
    active: Vec<Entity>,
    alive: Vec<bool>,
    archetypes: Vec<Archetype>,
}

impl EntityPool {
    /// Create a pool with at most `capacity` simultaneous entities
    ///
    /// Requests beyond [`META_MAX_ENTITIES`] are capped.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity > META_MAX_ENTITIES {
            warn!(requested = capacity, cap = META_MAX_ENTITIES, "entity capacity capped");
            META_MAX_ENTITIES
        } else {
            capacity
        };

        let mut free = VecDeque::with_capacity(capacity);
        for id in 0..capacity as i64 {
            free.push_back(Entity(id));
        }

        Self {
            capacity,
            free,
            active: Vec::new(),
            alive: vec![false; capacity],
            archetypes: vec![Archetype::new(); capacity],
        }
    }

    /// Activate a free id, or [`Entity::INVALID`] when the pool is exhausted
    ///
    /// The new entity starts with an empty archetype.
    pub fn add(&mut self) -> Entity {
        let Some(entity) = self.free.pop_front() else {
            return Entity::INVALID;
        };

        self.active.push(entity);
        self.alive[entity.index()] = true;
        self.archetypes[entity.index()].clear();
        entity
    }

    /// Return an id to the pool
    ///
    /// No-op for inactive or out-of-range ids. The archetype is zeroed so
    /// the id comes back clean when reissued.
    pub fn remove(&mut self, entity: Entity) {
        if !self.is_active(entity) {
            return;
        }

        if let Some(pos) = self.active.iter().position(|&e| e == entity) {
            self.active.remove(pos);
        }
        self.alive[entity.index()] = false;
        self.archetypes[entity.index()].clear();
        self.free.push_back(entity);
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        entity.is_valid()
            && entity.index() < self.capacity
            && self.alive[entity.index()]
    }

    /// Active ids in insertion order
    pub fn entities(&self) -> &[Entity] {
        &self.active
    }

    /// Overwrite an entity's archetype
    ///
    /// This is the only archetype mutator. Returns false for inactive ids.
    pub fn set_archetype(&mut self, entity: Entity, archetype: Archetype) -> bool {
        if !self.is_active(entity) {
            warn!(%entity, "cannot set archetype of an inactive entity");
            return false;
        }

        self.archetypes[entity.index()] = archetype;
        true
    }

    /// An entity's archetype; empty for inactive ids
    pub fn archetype_of(&self, entity: Entity) -> Archetype {
        if !self.is_active(entity) {
            return Archetype::new();
        }

        self.archetypes[entity.index()]
    }

    /// Number of active entities
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Deactivate everything and restore the freshly-constructed state
    pub fn clear(&mut self) {
        self.active.clear();
        self.free.clear();
        for id in 0..self.capacity as i64 {
            self.free.push_back(Entity(id));
        }
        self.alive.fill(false);
        for archetype in &mut self.archetypes {
            archetype.clear();
        }
    }
}
