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

//! Error types

use std::any::TypeId;
use std::fmt;

/// ECS error type
///
/// Every fallible operation reports through this enum; nothing in the
/// library panics on contract violations. Reads of absent data return
/// `Option` instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity pool or component column is full
    CapacityExceeded,

    /// Component type was never registered
    UnknownComponent(TypeId),

    /// Entity already carries a component of this type
    DuplicateComponent(TypeId),

    /// Entity id is out of range, freed, or never allocated
    InactiveEntity,
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::CapacityExceeded => write!(f, "Capacity exceeded"),
            EcsError::UnknownComponent(type_id) => {
                write!(f, "Component type not registered: {type_id:?}")
            }
            EcsError::DuplicateComponent(type_id) => {
                write!(f, "Component type already present on entity: {type_id:?}")
            }
            EcsError::InactiveEntity => write!(f, "Entity is inactive or out of range"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
