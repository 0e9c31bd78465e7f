//! Intrusive doubly linked lists threaded through pool slots.
//!
//! The free list and both active lists share the `prev`/`next` fields of the
//! slots, which makes removal from the middle O(1). A slot is on at most one
//! list, recorded in its `list` field.

use crate::patch::{ListKind, Patch};

#[derive(Debug)]
pub(crate) struct PatchList {
    kind: ListKind,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl PatchList {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<u32> {
        self.head
    }

    pub fn tail(&self) -> Option<u32> {
        self.tail
    }

    fn attach(&self, patches: &mut [Patch], index: u32, prev: Option<u32>, next: Option<u32>) {
        let p = &mut patches[index as usize];
        debug_assert_eq!(p.list, ListKind::Detached, "slot {index} is already on a list");
        p.list = self.kind;
        p.prev = prev;
        p.next = next;
    }

    pub fn push_back(&mut self, patches: &mut [Patch], index: u32) {
        self.attach(patches, index, self.tail, None);
        match self.tail {
            Some(t) => patches[t as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    pub fn push_front(&mut self, patches: &mut [Patch], index: u32) {
        self.attach(patches, index, None, self.head);
        match self.head {
            Some(h) => patches[h as usize].prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.len += 1;
    }

    /// Insert `index` immediately before `at`, which must be on this list.
    pub fn insert_before(&mut self, patches: &mut [Patch], at: u32, index: u32) {
        debug_assert_eq!(patches[at as usize].list, self.kind);
        let prev = patches[at as usize].prev;
        self.attach(patches, index, prev, Some(at));
        patches[at as usize].prev = Some(index);
        match prev {
            Some(p) => patches[p as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.len += 1;
    }

    /// Insert keeping the list in descending priority order by scanning from
    /// the head.
    pub fn insert_by_priority(&mut self, patches: &mut [Patch], index: u32) {
        let priority = patches[index as usize].priority;
        let mut cursor = self.head;
        while let Some(c) = cursor {
            if patches[c as usize].priority < priority {
                self.insert_before(patches, c, index);
                return;
            }
            cursor = patches[c as usize].next;
        }
        self.push_back(patches, index);
    }

    pub fn remove(&mut self, patches: &mut [Patch], index: u32) {
        let (prev, next) = {
            let p = &mut patches[index as usize];
            debug_assert_eq!(p.list, self.kind, "slot {index} is not on this list");
            p.list = ListKind::Detached;
            (p.prev.take(), p.next.take())
        };
        match prev {
            Some(p) => patches[p as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => patches[n as usize].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    pub fn pop_front(&mut self, patches: &mut [Patch]) -> Option<u32> {
        let head = self.head?;
        self.remove(patches, head);
        Some(head)
    }

    /// Slot indices from head to tail.
    pub fn iter<'a>(&self, patches: &'a [Patch]) -> ListIter<'a> {
        ListIter {
            patches,
            cursor: self.head,
            forward: true,
        }
    }

    /// Slot indices from tail to head.
    pub fn iter_rev<'a>(&self, patches: &'a [Patch]) -> ListIter<'a> {
        ListIter {
            patches,
            cursor: self.tail,
            forward: false,
        }
    }
}

pub(crate) struct ListIter<'a> {
    patches: &'a [Patch],
    cursor: Option<u32>,
    forward: bool,
}

impl Iterator for ListIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.cursor?;
        let p = &self.patches[current as usize];
        self.cursor = if self.forward { p.next } else { p.prev };
        Some(current)
    }
}
