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

//! Dense component columns
//!
//! A [`Column`] stores every value of one component type in a single
//! byte buffer of fixed-stride slots, keyed by external entity id through
//! an id-to-slot map. Add, get, and remove are O(1); removal swap-fills
//! the vacated slot from the tail and zeroes the tail bytes.
//!
//! The buffer is allocated once at construction and never moves, so a raw
//! pointer into a slot stays valid across operations on other ids and is
//! invalidated only by `remove`/`clear`/reassignment touching that slot.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::any::Any;
use std::marker::PhantomData;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::component::Component;
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::utils::align_to;

/// Minimum slot alignment in bytes, applied even to smaller types
const MIN_ALIGNMENT: usize = 8;

/// Type-erased column interface
///
/// Lets a registry own heterogeneous columns behind one trait object and
/// sweep them without knowing the component type. Typed access goes
/// through the `as_any` downcasts.
pub trait AnyColumn: Send + Sync {
    fn remove(&mut self, entity: Entity);

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    /// Active ids in slot order
    fn ids(&self) -> &[Entity];

    /// Deep copy preserving the concrete component type
    fn clone_boxed(&self) -> Box<dyn AnyColumn>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense fixed-capacity storage for one component type
///
/// Layout: `capacity + 1` slots of `stride` bytes each, where
/// `stride = align_to(size_of::<T>(), alignment)` and `alignment` is at
/// least [`MIN_ALIGNMENT`]. Slots `[0, len)` are always packed.
pub struct Column<T: Component> {
    buffer: NonNull<u8>,
    layout: Layout,
    stride: usize,
    capacity: usize,
    count: usize,
    /// slot index -> owning id
    slot_ids: Vec<Entity>,
    /// id -> slot index
    slots: FxHashMap<Entity, usize>,
    _marker: PhantomData<T>,
}

// The raw buffer is uniquely owned; the column is exactly as thread-safe
// as a Vec<T> would be.
unsafe impl<T: Component> Send for Column<T> {}
unsafe impl<T: Component> Sync for Column<T> {}

impl<T: Component> Column<T> {
    /// Create a column holding at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let alignment = std::mem::align_of::<T>().max(MIN_ALIGNMENT);
        let stride = align_to(std::mem::size_of::<T>().max(1), alignment);

        // One slot of slack past the capacity, mirroring the pool layout
        // this store descends from. The allocator honors `alignment`, so
        // slot 0 needs no leading pad.
        let layout = Layout::from_size_align(stride * (capacity + 1), alignment)
            .expect("column layout parameters are statically sane");

        let buffer = unsafe { alloc_zeroed(layout) };
        let Some(buffer) = NonNull::new(buffer) else {
            handle_alloc_error(layout);
        };

        Self {
            buffer,
            layout,
            stride,
            capacity,
            count: 0,
            slot_ids: Vec::with_capacity(capacity),
            slots: FxHashMap::default(),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn slot_ptr(&self, slot: usize) -> *mut u8 {
        debug_assert!(slot <= self.capacity);
        unsafe { self.buffer.as_ptr().add(slot * self.stride) }
    }

    #[inline]
    fn value_ptr(&self, slot: usize) -> *mut T {
        self.slot_ptr(slot) as *mut T
    }

    /// Store `value` under `entity`
    ///
    /// Fails without mutating when the column is full or the id is
    /// already present.
    pub fn insert(&mut self, entity: Entity, value: T) -> Result<Entity> {
        if self.count >= self.capacity {
            return Err(EcsError::CapacityExceeded);
        }

        if self.slots.contains_key(&entity) {
            debug!(%entity, "column already holds this id");
            return Err(EcsError::DuplicateComponent(std::any::TypeId::of::<T>()));
        }

        let slot = self.count;
        unsafe {
            std::ptr::write(self.value_ptr(slot), value);
        }
        self.slots.insert(entity, slot);
        self.slot_ids.push(entity);
        self.count += 1;

        Ok(entity)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        let &slot = self.slots.get(&entity)?;
        Some(unsafe { &*self.value_ptr(slot) })
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let &slot = self.slots.get(&entity)?;
        Some(unsafe { &mut *self.value_ptr(slot) })
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slots.contains_key(&entity)
    }

    /// Drop the value stored under `entity`
    ///
    /// The tail slot is moved into the vacated slot and the vacated tail
    /// bytes are zeroed. No-op for absent ids.
    pub fn remove(&mut self, entity: Entity) {
        let Some(slot) = self.slots.remove(&entity) else {
            return;
        };

        let last = self.count - 1;
        unsafe {
            std::ptr::drop_in_place(self.value_ptr(slot));

            if slot != last {
                std::ptr::copy_nonoverlapping(
                    self.slot_ptr(last),
                    self.slot_ptr(slot),
                    self.stride,
                );
                let moved_id = self.slot_ids[last];
                self.slot_ids[slot] = moved_id;
                self.slots.insert(moved_id, slot);
            }

            // The vacated tail slot must read as zeroes until reused.
            std::ptr::write_bytes(self.slot_ptr(last), 0, self.stride);
        }

        self.slot_ids.pop();
        self.count = last;
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes occupied by live slots
    pub fn size_bytes(&self) -> usize {
        self.count * self.stride
    }

    /// Active ids in slot order
    pub fn ids(&self) -> &[Entity] {
        &self.slot_ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.slot_ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, unsafe { &*self.value_ptr(slot) }))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        // Slots are disjoint; hand out one &mut per slot.
        let stride = self.stride;
        let base = self.buffer.as_ptr();
        self.slot_ids.iter().enumerate().map(move |(slot, &id)| {
            let ptr = unsafe { base.add(slot * stride) } as *mut T;
            (id, unsafe { &mut *ptr })
        })
    }

    /// Drop every value and zero the buffer; capacity is preserved
    pub fn clear(&mut self) {
        unsafe {
            for slot in 0..self.count {
                std::ptr::drop_in_place(self.value_ptr(slot));
            }
            std::ptr::write_bytes(self.buffer.as_ptr(), 0, self.layout.size());
        }
        self.slots.clear();
        self.slot_ids.clear();
        self.count = 0;
    }

    /// Discard current contents and become a deep copy of `other`
    ///
    /// Afterwards the two columns share no storage; mutating one never
    /// affects the other. Slot order is preserved so the copies are
    /// byte-comparable for plain data.
    pub fn copy_from(&mut self, other: &Column<T>) {
        self.clear();

        if self.capacity != other.capacity {
            // Reallocate at the source capacity; the stride is a property
            // of T and stays the same.
            let layout = Layout::from_size_align(
                self.stride * (other.capacity + 1),
                self.layout.align(),
            )
            .expect("column layout parameters are statically sane");
            unsafe {
                dealloc(self.buffer.as_ptr(), self.layout);
            }
            let buffer = unsafe { alloc_zeroed(layout) };
            let Some(buffer) = NonNull::new(buffer) else {
                handle_alloc_error(layout);
            };
            self.buffer = buffer;
            self.layout = layout;
            self.capacity = other.capacity;
        }

        for (slot, &id) in other.slot_ids.iter().enumerate() {
            let value = unsafe { (*other.value_ptr(slot)).clone() };
            unsafe {
                std::ptr::write(self.value_ptr(slot), value);
            }
            self.slots.insert(id, slot);
            self.slot_ids.push(id);
        }
        self.count = other.count;
    }
}

impl<T: Component> Clone for Column<T> {
    fn clone(&self) -> Self {
        let mut copy = Column::new(self.capacity);
        copy.copy_from(self);
        copy
    }
}

impl<T: Component> Drop for Column<T> {
    fn drop(&mut self) {
        unsafe {
            for slot in 0..self.count {
                std::ptr::drop_in_place(self.value_ptr(slot));
            }
            dealloc(self.buffer.as_ptr(), self.layout);
        }
    }
}

impl<T: Component> AnyColumn for Column<T> {
    fn remove(&mut self, entity: Entity) {
        Column::remove(self, entity);
    }

    fn clear(&mut self) {
        Column::clear(self);
    }

    fn len(&self) -> usize {
        Column::len(self)
    }

    fn capacity(&self) -> usize {
        Column::capacity(self)
    }

    fn ids(&self) -> &[Entity] {
        Column::ids(self)
    }

    fn clone_boxed(&self) -> Box<dyn AnyColumn> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
