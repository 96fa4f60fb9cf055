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

//! Archetype queries
//!
//! A query is a registered archetype plus the maintained set of entities
//! whose archetype is a superset. Membership is updated eagerly on every
//! archetype transition, so reads are set lookups with no scanning.

use ahash::AHashSet;
use tracing::warn;

use crate::archetype::Archetype;
use crate::entity::Entity;

/// Stable handle to a registered query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(pub u32);

impl QueryId {
    /// The invalid sentinel
    pub const INVALID: QueryId = QueryId(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != QueryId::INVALID
    }
}

impl Default for QueryId {
    fn default() -> Self {
        QueryId::INVALID
    }
}

struct QueryEntry {
    archetype: Archetype,
    members: AHashSet<Entity>,
}

/// Maintains entity membership for every registered query archetype
///
/// Invariant: an entity belongs to a query's set exactly when the query
/// archetype is a subset of the entity's archetype.
#[derive(Default)]
pub struct QueryIndex {
    queries: Vec<QueryEntry>,
    empty: AHashSet<Entity>,
}

impl QueryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archetype, returning its stable query id
    ///
    /// Registering an archetype twice returns the id it already holds.
    /// The empty archetype is rejected with [`QueryId::INVALID`].
    pub fn add_query(&mut self, archetype: Archetype) -> QueryId {
        if archetype.is_empty() {
            warn!("rejecting query registration for the empty archetype");
            return QueryId::INVALID;
        }

        if let Some(existing) = self.query_id_of(&archetype) {
            return existing;
        }

        self.queries.push(QueryEntry {
            archetype,
            members: AHashSet::new(),
        });
        QueryId(self.queries.len() as u32 - 1)
    }

    /// Id under which `archetype` is registered, if any
    pub fn query_id_of(&self, archetype: &Archetype) -> Option<QueryId> {
        self.queries
            .iter()
            .position(|entry| entry.archetype == *archetype)
            .map(|index| QueryId(index as u32))
    }

    /// True if some registered query archetype is exactly `archetype`
    pub fn contains_archetype(&self, archetype: &Archetype) -> bool {
        self.query_id_of(archetype).is_some()
    }

    /// Apply an archetype transition for one entity
    ///
    /// First drops the entity from every query covered by the old
    /// archetype, then inserts it into every query covered by the new
    /// one. Running the passes in that order keeps re-insertion into
    /// still-matching queries idempotent.
    pub fn move_entity(&mut self, entity: Entity, old: &Archetype, new: &Archetype) {
        for entry in &mut self.queries {
            if entry.archetype.supports(old) {
                entry.members.remove(&entity);
            }
        }

        for entry in &mut self.queries {
            if entry.archetype.supports(new) {
                entry.members.insert(entity);
            }
        }
    }

    /// Drop an entity from every query
    pub fn remove_entity(&mut self, entity: Entity) {
        for entry in &mut self.queries {
            entry.members.remove(&entity);
        }
    }

    /// Members of a query; unknown ids yield an empty view
    pub fn entities(&self, query: QueryId) -> &AHashSet<Entity> {
        match self.queries.get(query.0 as usize) {
            Some(entry) => &entry.members,
            None => &self.empty,
        }
    }

    /// Members of the query registered exactly for `archetype`
    pub fn entities_matching(&self, archetype: &Archetype) -> &AHashSet<Entity> {
        match self
            .queries
            .iter()
            .find(|entry| entry.archetype == *archetype)
        {
            Some(entry) => &entry.members,
            None => &self.empty,
        }
    }

    /// Number of registered queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Drop every entity from every query, keeping registrations
    pub fn clear_entities(&mut self) {
        for entry in &mut self.queries {
            entry.members.clear();
        }
    }
}
