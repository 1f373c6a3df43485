//! Reusable scratch storage.
//!
//! `Pool<T>` is an arena with an explicit free list: `acquire` hands out a typed `Handle`,
//! `release` returns the slot. Every release bumps the slot's generation, so a handle outlives
//! its slot only as a stale handle: releasing or reading it again is rejected, even after the
//! slot has been handed to a new owner. `ListPool<T>` recycles whole `Vec`s by value.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Objects that can be recycled by a `Pool`.
pub trait Poolable: Default {
    /// Return the object to its freshly constructed state.
    fn reset(&mut self);
}

pub struct Handle<T: 'static> {
    index: u32,
    generation: u32,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _phantom: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T: 'static> Copy for Handle<T> {}

impl<T: 'static> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T: 'static> Eq for Handle<T> {}

impl<T: 'static> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T: 'static> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    live: bool,
    generation: u32,
}

impl<T> Slot<T> {
    fn holds(&self, handle_generation: u32) -> bool {
        self.live && self.generation == handle_generation
    }
}

#[derive(Debug)]
pub struct Pool<T: 'static> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T: Poolable + 'static> Default for Pool<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Poolable + 'static> Pool<T> {
    /// Create a pool with `capacity` idle objects ready to hand out.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        let mut free = Vec::with_capacity(capacity);
        for i in (0..capacity).rev() {
            free.push(i as u32);
        }
        slots.resize_with(capacity, || Slot {
            value: T::default(),
            live: false,
            generation: 0,
        });
        Self { slots, free }
    }

    pub fn acquire(&mut self) -> Handle<T> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value.reset();
            slot.live = true;
            return Handle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: T::default(),
            live: true,
            generation: 0,
        });
        Handle::new(index, 0)
    }

    /// Return a slot to the free list. Returns `false` (and changes nothing) if the handle was
    /// already released, including when its slot now belongs to a newer handle.
    pub fn release(&mut self, handle: Handle<T>) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if !slot.holds(handle.generation) {
            return false;
        }
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        true
    }

    pub fn release_all(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.live {
                slot.live = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i as u32);
            }
        }
    }

    pub fn is_live(&self, handle: Handle<T>) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|s| s.holds(handle.generation))
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|s| s.holds(handle.generation))
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.holds(handle.generation))
            .map(|s| &mut s.value)
    }

    /// Number of idle objects waiting in the free list.
    pub fn idle_len(&self) -> usize {
        self.free.len()
    }

    pub fn live_len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Total number of objects ever allocated by this pool.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Poolable + 'static> Index<Handle<T>> for Pool<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        let slot = &self.slots[handle.index()];
        debug_assert!(slot.holds(handle.generation), "use of released pool handle {handle:?}");
        &slot.value
    }
}

impl<T: Poolable + 'static> IndexMut<Handle<T>> for Pool<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        let slot = &mut self.slots[handle.index()];
        debug_assert!(slot.holds(handle.generation), "use of released pool handle {handle:?}");
        &mut slot.value
    }
}

/// Recycles `Vec<T>` buffers, keeping at most `capacity` idle ones.
#[derive(Debug)]
pub struct ListPool<T> {
    idle: Vec<Vec<T>>,
    capacity: usize,
}

impl<T> ListPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// An empty list, reusing an idle allocation when one is available.
    pub fn take(&mut self) -> Vec<T> {
        self.idle.pop().unwrap_or_default()
    }

    pub fn give(&mut self, mut list: Vec<T>) {
        if self.idle.len() >= self.capacity {
            return;
        }
        list.clear();
        self.idle.push(list);
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }
}
