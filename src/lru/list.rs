//! Recency List Module
//!
//! Arena-backed doubly linked list that keeps cache entries in access order.

// == Constants ==
/// Link value meaning "no node".
const NIL: usize = usize::MAX;

// == Node ==
#[derive(Debug)]
struct Node<T> {
    /// `None` while the slot sits on the free list
    item: Option<T>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// Nodes live in a `Vec` and link to each other by index, so promotion,
/// unlinking and eviction are all O(1) without any unsafe pointer juggling.
/// Removed slots are recycled through a free list.
///
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug)]
pub struct RecencyList<T> {
    nodes: Vec<Node<T>>,
    head: usize,
    tail: usize,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item as the most recently used and returns its slot index.
    ///
    /// The index stays valid until the item is removed or popped.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item: Some(item),
            prev: NIL,
            next: self.head,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the item at `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if idx == self.head || !self.is_live(idx) {
            return;
        }
        self.unlink(idx);
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    // == Remove ==
    /// Removes the item at `idx`, returning it and recycling the slot.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        if !self.is_live(idx) {
            return None;
        }
        self.unlink(idx);
        self.len -= 1;
        self.free.push(idx);
        self.nodes[idx].item.take()
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        self.remove(self.tail)
    }

    // == Accessors ==
    /// Returns the item at `idx` without changing its position.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.nodes.get(idx).and_then(|node| node.item.as_ref())
    }

    /// Returns the item at `idx` mutably without changing its position.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.nodes.get_mut(idx).and_then(|node| node.item.as_mut())
    }

    /// Returns the least recently used item without removing it.
    pub fn back(&self) -> Option<&T> {
        if self.tail == NIL {
            None
        } else {
            self.get(self.tail)
        }
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Clear ==
    /// Drops every item and empties the arena, keeping its allocation.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_live(&self, idx: usize) -> bool {
        self.nodes.get(idx).is_some_and(|node| node.item.is_some())
    }

    /// Detaches a node from its neighbours, fixing head and tail.
    fn unlink(&mut self, idx: usize) {
        let Node { prev, next, .. } = self.nodes[idx];

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

// == Iterator ==
/// Iterator over a [`RecencyList`], most recently used first.
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        node.item.as_ref()
    }
}
