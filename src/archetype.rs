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

//! Fixed-width archetype bitset
//!
//! An archetype records which component signatures an entity currently
//! carries, one bit per signature. All operations are O(limbs) with a
//! compile-time limb count.

use std::cmp::Ordering;

use crate::signature::{Signature, MAX_SIGNATURES};

/// Number of bits per limb
const LIMB_BITS: usize = u64::BITS as usize;

/// Limb count; the bitset must cover every allocatable signature
const LIMB_COUNT: usize = MAX_SIGNATURES.div_ceil(LIMB_BITS);

/// Bitset over component signatures
///
/// Signature indices at or beyond the bitset width are silently ignored
/// by [`merge_signature`](Archetype::merge_signature) and
/// [`remove_signature`](Archetype::remove_signature).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Archetype {
    limbs: [u64; LIMB_COUNT],
}

impl Archetype {
    /// The empty archetype
    pub fn new() -> Self {
        Self::default()
    }

    /// Build directly from a list of signatures
    pub fn from_signatures(signatures: &[Signature]) -> Self {
        let mut archetype = Self::new();
        for &signature in signatures {
            archetype.merge_signature(signature);
        }
        archetype
    }

    // Signatures at or beyond MAX_SIGNATURES (the error signature included)
    // have no bit position.
    fn split(signature: Signature) -> Option<(usize, u64)> {
        let index = signature as usize;
        if index >= MAX_SIGNATURES {
            return None;
        }
        Some((index / LIMB_BITS, 1u64 << (index % LIMB_BITS)))
    }

    /// Set the bit for `signature`
    pub fn merge_signature(&mut self, signature: Signature) {
        if let Some((limb, bit)) = Self::split(signature) {
            self.limbs[limb] |= bit;
        }
    }

    /// Clear the bit for `signature`
    pub fn remove_signature(&mut self, signature: Signature) {
        if let Some((limb, bit)) = Self::split(signature) {
            self.limbs[limb] &= !bit;
        }
    }

    /// True if the bit for `signature` is set
    pub fn supports_signature(&self, signature: Signature) -> bool {
        match Self::split(signature) {
            Some((limb, bit)) => (self.limbs[limb] & bit) != 0,
            None => false,
        }
    }

    /// True if every signature in `self` is present in `other`
    ///
    /// The empty archetype supports nothing, itself included. A query
    /// archetype `q` matches entity archetype `a` exactly when
    /// `q.supports(&a)`.
    pub fn supports(&self, other: &Archetype) -> bool {
        if self.is_empty() {
            return false;
        }

        self.limbs
            .iter()
            .zip(other.limbs.iter())
            .all(|(mine, theirs)| (mine & theirs) == *mine)
    }

    /// Union in place
    pub fn merge(&mut self, other: &Archetype) {
        for (mine, theirs) in self.limbs.iter_mut().zip(other.limbs.iter()) {
            *mine |= theirs;
        }
    }

    /// Difference in place
    pub fn remove(&mut self, other: &Archetype) {
        for (mine, theirs) in self.limbs.iter_mut().zip(other.limbs.iter()) {
            *mine &= !theirs;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.iter().all(|&limb| limb == 0)
    }

    /// Clear every bit
    pub fn clear(&mut self) {
        self.limbs = [0; LIMB_COUNT];
    }

    /// Number of set signatures
    pub fn count(&self) -> usize {
        self.limbs.iter().map(|limb| limb.count_ones() as usize).sum()
    }

    /// Iterate set signatures in ascending order
    pub fn signatures(&self) -> Signatures<'_> {
        Signatures {
            archetype: self,
            limb_index: 0,
            current: self.limbs[0],
        }
    }
}

// Lexicographic from the most-significant limb down.
impl Ord for Archetype {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..LIMB_COUNT).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Archetype {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Iterator over the set signatures of an archetype
pub struct Signatures<'a> {
    archetype: &'a Archetype,
    limb_index: usize,
    current: u64,
}

impl Iterator for Signatures<'_> {
    type Item = Signature;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let trailing = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some((self.limb_index * LIMB_BITS + trailing) as Signature);
            }

            self.limb_index += 1;
            if self.limb_index >= LIMB_COUNT {
                return None;
            }
            self.current = self.archetype.limbs[self.limb_index];
        }
    }
}
