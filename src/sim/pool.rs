//! Fixed-capacity entity pools
//!
//! Every entity collection is a slot arena sized once at construction.
//! Spawning takes the first inactive slot by index, despawning only clears
//! the active flag, so slot ids stay stable for the whole tick. A full pool
//! drops the spawn instead of growing.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// An entity that can live in a [`Pool`] slot
pub trait Slot: Default {
    fn is_active(&self) -> bool;
}

/// Slot arena with stable indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T: Slot> Pool<T> {
    /// Preallocate `capacity` inactive slots
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the first inactive slot
    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.is_active())
    }

    /// Place `entity` in the first free slot. Returns `None` (and drops the
    /// entity) when the pool is exhausted.
    pub fn spawn(&mut self, entity: T) -> Option<usize> {
        match self.free_slot() {
            Some(i) => {
                self.slots[i] = entity;
                Some(i)
            }
            None => {
                log::trace!("pool exhausted ({} slots), spawn dropped", self.slots.len());
                None
            }
        }
    }

    /// Overwrite a specific slot regardless of its state
    pub fn put(&mut self, index: usize, entity: T) {
        self.slots[index] = entity;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Reset every slot to the inactive default
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = T::default());
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    pub fn is_full(&self) -> bool {
        self.free_slot().is_none()
    }

    /// All slots, including inactive ones
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.slots.iter_mut()
    }

    /// Active slots with their indices, in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.is_active())
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.is_active())
    }
}

impl<T> Index<usize> for Pool<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.slots[index]
    }
}

impl<T> IndexMut<usize> for Pool<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.slots[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Dot {
        active: bool,
        tag: u32,
    }

    impl Slot for Dot {
        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn dot(tag: u32) -> Dot {
        Dot { active: true, tag }
    }

    #[test]
    fn test_spawn_takes_first_free_slot() {
        let mut pool: Pool<Dot> = Pool::new(3);
        assert_eq!(pool.spawn(dot(1)), Some(0));
        assert_eq!(pool.spawn(dot(2)), Some(1));

        // Free slot 0, the next spawn reuses it before slot 2
        pool[0].active = false;
        assert_eq!(pool.spawn(dot(3)), Some(0));
        assert_eq!(pool[0].tag, 3);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_exhausted_pool_drops_spawn() {
        let mut pool: Pool<Dot> = Pool::new(2);
        pool.spawn(dot(1));
        pool.spawn(dot(2));
        assert!(pool.is_full());
        assert_eq!(pool.spawn(dot(3)), None);
        assert_eq!(pool.capacity(), 2);
        assert!(pool.iter().all(|d| d.tag != 3));
    }

    #[test]
    fn test_despawn_keeps_slot_identity() {
        let mut pool: Pool<Dot> = Pool::new(4);
        for tag in 0..4 {
            pool.spawn(dot(tag));
        }
        pool[1].active = false;
        let active: Vec<usize> = pool.iter_active().map(|(i, _)| i).collect();
        assert_eq!(active, vec![0, 2, 3]);
        assert_eq!(pool[3].tag, 3);
    }

    #[test]
    fn test_clear_resets_all_slots() {
        let mut pool: Pool<Dot> = Pool::new(3);
        pool.spawn(dot(7));
        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool[0], Dot::default());
    }
}
