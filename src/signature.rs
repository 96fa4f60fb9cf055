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

//! Component signature allocation
//!
//! A signature is the dense small integer identifying one registered
//! component type. Signatures double as bit positions in an [`Archetype`](crate::Archetype).

use std::any::TypeId;

use rustc_hash::FxHashMap;
use tracing::warn;

/// Signature index of a registered component type
pub type Signature = u16;

/// Number of distinct component types a registry can hold
pub const MAX_SIGNATURES: usize = 255;

/// Reserved signature meaning "unregistered"
pub const ERROR_SIGNATURE: Signature = MAX_SIGNATURES as Signature;

/// Maps component type identities to dense signatures
///
/// Signatures are handed out in registration order, starting at zero.
/// Registration is idempotent. Once `MAX_SIGNATURES` types are registered,
/// further registration returns [`ERROR_SIGNATURE`].
#[derive(Debug, Clone, Default)]
pub struct SignatureRegistry {
    type_to_signature: FxHashMap<TypeId, Signature>,
    counter: Signature,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type, returning its signature
    ///
    /// Re-registering a known type returns the signature it already holds.
    pub fn register<T: 'static>(&mut self) -> Signature {
        self.register_type_id(TypeId::of::<T>())
    }

    /// Register by raw type id
    pub fn register_type_id(&mut self, type_id: TypeId) -> Signature {
        if let Some(&signature) = self.type_to_signature.get(&type_id) {
            return signature;
        }

        if self.counter as usize >= MAX_SIGNATURES {
            warn!(?type_id, "signature space saturated, cannot register type");
            return ERROR_SIGNATURE;
        }

        let signature = self.counter;
        self.type_to_signature.insert(type_id, signature);
        self.counter += 1;
        signature
    }

    /// Look up a registered type, or [`ERROR_SIGNATURE`] if unknown
    pub fn signature_of<T: 'static>(&self) -> Signature {
        self.signature_of_type_id(TypeId::of::<T>())
    }

    /// Look up by raw type id
    pub fn signature_of_type_id(&self, type_id: TypeId) -> Signature {
        match self.type_to_signature.get(&type_id) {
            Some(&signature) => signature,
            None => ERROR_SIGNATURE,
        }
    }

    /// Number of registered component types
    pub fn len(&self) -> usize {
        self.counter as usize
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }
}
