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

//! Lattice ECS - dense-column entity-component container
//!
//! Entities are stable integer ids, components are plain data stored in
//! per-type dense columns, and queries are maintained sets of entities
//! matching an archetype. A first-class edge component links pairs of
//! entities, and bounded scratch buffers nest inside the container as
//! ordinary component values.

pub mod archetype;
pub mod buffer;
pub mod column;
pub mod component;
pub mod edge;
pub mod entity;
pub mod error;
pub mod query;
pub mod signature;
pub mod system;
pub mod utils;
pub mod world;

// Re-exports for convenience
pub use archetype::Archetype;
pub use buffer::EntityComponentBuffer;
pub use column::{AnyColumn, Column};
pub use component::{Component, ComponentRegistry, ComponentSet};
pub use edge::{Edge, EdgeFlag};
pub use entity::{Entity, EntityPool};
pub use error::{EcsError, Result};
pub use query::{QueryId, QueryIndex};
pub use signature::{Signature, SignatureRegistry, ERROR_SIGNATURE, MAX_SIGNATURES};
pub use system::{System, SystemRegistry};
pub use world::World;
