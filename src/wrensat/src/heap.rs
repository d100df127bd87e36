/*****************************************************************************************[heap.rs]
wrensat -- a CDCL SAT solver

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use crate::intmap::{AsIndex, IntMap};
use std::{cmp, ops};

/// Ordering used by a [`Heap`]. The element for which `cmp` returns
/// `Less` against every other element sits at the root.
pub trait Comparator<T: ?Sized> {
    fn cmp(&self, lhs: &T, rhs: &T) -> cmp::Ordering;

    fn lt(&self, lhs: &T, rhs: &T) -> bool {
        self.cmp(lhs, rhs) == cmp::Ordering::Less
    }
}

/// Storage of an indexed binary min-heap.
///
/// The comparator is supplied at each use via [`HeapData::promote`], so
/// the ordering may borrow state (e.g. an activity table) that lives next
/// to the heap in a larger structure.
#[derive(Debug, Clone)]
pub struct HeapData<K: AsIndex> {
    heap: Vec<K>,
    indices: IntMap<K, i32>,
}

impl<K: AsIndex> Default for HeapData<K> {
    fn default() -> Self {
        Self {
            heap: Vec::new(),
            indices: IntMap::new(),
        }
    }
}

impl<K: AsIndex> HeapData<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn in_heap(&self, k: K) -> bool {
        self.indices.has(k) && self.indices[k] >= 0
    }

    pub fn promote<Comp: Comparator<K>>(&mut self, comp: Comp) -> Heap<K, Comp> {
        Heap { data: self, comp }
    }
}

impl<K: AsIndex> ops::Index<usize> for HeapData<K> {
    type Output = K;
    fn index(&self, index: usize) -> &Self::Output {
        &self.heap[index]
    }
}

/// A heap together with its comparator; the only handle through which the
/// ordering-sensitive operations are reachable.
#[derive(Debug)]
pub struct Heap<'a, K: AsIndex + 'a, Comp: Comparator<K>> {
    data: &'a mut HeapData<K>,
    comp: Comp,
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> ops::Deref for Heap<'a, K, Comp> {
    type Target = HeapData<K>;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> Heap<'a, K, Comp> {
    fn percolate_up(&mut self, mut i: u32) {
        let x = self.data.heap[i as usize];
        let mut p = parent_index(i);

        while i != 0 && self.comp.lt(&x, &self.data.heap[p as usize]) {
            let tmp = self.data.heap[p as usize];
            self.data.heap[i as usize] = tmp;
            self.data.indices[tmp] = i as i32;
            i = p;
            p = parent_index(p);
        }
        self.data.heap[i as usize] = x;
        self.data.indices[x] = i as i32;
    }

    fn percolate_down(&mut self, mut i: u32) {
        let x = self.data.heap[i as usize];
        while (left_index(i) as usize) < self.data.heap.len() {
            let child = if (right_index(i) as usize) < self.data.heap.len()
                && self.comp.lt(
                    &self.data.heap[right_index(i) as usize],
                    &self.data.heap[left_index(i) as usize],
                ) {
                right_index(i)
            } else {
                left_index(i)
            };
            if !self.comp.lt(&self.data.heap[child as usize], &x) {
                break;
            }
            let tmp = self.data.heap[child as usize];
            self.data.heap[i as usize] = tmp;
            self.data.indices[tmp] = i as i32;
            i = child;
        }
        self.data.heap[i as usize] = x;
        self.data.indices[x] = i as i32;
    }

    /// Restore the heap property after the key of `k` decreased.
    pub fn decrease(&mut self, k: K) {
        debug_assert!(self.in_heap(k));
        let k_index = self.data.indices[k];
        self.percolate_up(k_index as u32);
    }

    pub fn insert(&mut self, k: K) {
        self.data.indices.reserve(k, -1);
        debug_assert!(!self.in_heap(k));

        self.data.indices[k] = self.data.heap.len() as i32;
        self.data.heap.push(k);
        let k_index = self.data.indices[k];
        self.percolate_up(k_index as u32);
    }

    pub fn remove_min(&mut self) -> K {
        let x = *self.data.heap.first().expect("heap is empty");
        let last = *self.data.heap.last().expect("heap is empty");
        self.data.heap[0] = last;
        self.data.indices[last] = 0;
        self.data.indices[x] = -1;
        self.data.heap.pop().expect("cannot pop from empty heap");
        if self.data.heap.len() > 1 {
            self.percolate_down(0);
        }
        x
    }

    /// Rebuild from scratch, from the elements in `ns`.
    pub fn build(&mut self, ns: &[K]) {
        for i in 0..self.data.heap.len() {
            let x = self.data.heap[i];
            self.data.indices[x] = -1;
        }
        self.data.heap.clear();

        for (i, &x) in ns.iter().enumerate() {
            self.data.indices.reserve(x, -1);
            self.data.indices[x] = i as i32;
            self.data.heap.push(x);
        }

        let mut i = self.data.heap.len() as i32 / 2 - 1;
        while i >= 0 {
            self.percolate_down(i as u32);
            i -= 1;
        }
    }
}

#[inline(always)]
fn left_index(i: u32) -> u32 {
    i * 2 + 1
}
#[inline(always)]
fn right_index(i: u32) -> u32 {
    (i + 1) * 2
}
#[inline(always)]
fn parent_index(i: u32) -> u32 {
    (i.wrapping_sub(1)) >> 1
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Id(usize);
    impl AsIndex for Id {
        fn as_index(self) -> usize {
            self.0
        }
        fn from_index(index: usize) -> Self {
            Id(index)
        }
    }

    struct ByIndex;
    impl Comparator<Id> for ByIndex {
        fn cmp(&self, lhs: &Id, rhs: &Id) -> cmp::Ordering {
            lhs.0.cmp(&rhs.0)
        }
    }

    #[test]
    fn test_insert_remove_min_orders_elements() {
        let mut data: HeapData<Id> = HeapData::new();
        let mut heap = data.promote(ByIndex);
        for &i in &[4usize, 1, 3, 0, 2] {
            heap.insert(Id(i));
        }
        assert_eq!(heap.len(), 5);
        for expect in 0..5usize {
            assert_eq!(heap.remove_min(), Id(expect));
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_build_replaces_content() {
        let mut data: HeapData<Id> = HeapData::new();
        {
            let mut heap = data.promote(ByIndex);
            heap.insert(Id(7));
            heap.build(&[Id(2), Id(5), Id(1)]);
        }
        assert!(!data.in_heap(Id(7)));
        let mut heap = data.promote(ByIndex);
        assert_eq!(heap.remove_min(), Id(1));
        assert_eq!(heap.remove_min(), Id(2));
        assert_eq!(heap.remove_min(), Id(5));
    }
}
