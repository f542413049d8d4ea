//! Nodes and the arena they live in.
//!
//! Forward references are `u32` slots into an [`Arena`] rather than pointers,
//! with [`NULL`] standing in for "no next node". The level-0 chain is the
//! ownership chain: a list owns exactly the nodes reachable from its sentinel
//! along level 0. Links above level 0 are lookup shortcuts and are never
//! followed to free a node.

use smallvec::SmallVec;
use tracing::trace;

/// Node index type. u32 saves space vs usize on 64-bit.
pub(crate) type Idx = u32;

/// Null index marker.
pub(crate) const NULL: Idx = Idx::MAX;

/// One level record: where this level's edge goes and how many elements it
/// steps over. A `NULL` edge spans to the logical end of the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub next: Idx,
    pub span: usize,
}

impl Link {
    const EMPTY: Link = Link { next: NULL, span: 1 };
}

/// A node of the list. Sentinels carry no value.
#[derive(Debug)]
pub(crate) struct Node<T> {
    value: Option<T>,
    /// `links[level]` for every level `0..=height`.
    links: SmallVec<[Link; 4]>,
}

impl<T> Node<T> {
    fn new(value: Option<T>, height: usize) -> Node<T> {
        let mut links = SmallVec::with_capacity(height + 1);
        links.resize(height + 1, Link::EMPTY);
        Node { value, links }
    }

    pub fn height(&self) -> usize {
        self.links.len() - 1
    }

    pub fn link(&self, level: usize) -> Link {
        self.links[level]
    }

    pub fn next(&self, level: usize) -> Idx {
        self.links[level].next
    }

    pub fn value(&self) -> &T {
        self.value.as_ref().expect("sentinel has no value")
    }

    pub fn value_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("sentinel has no value")
    }

    pub fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }
}

/// Slot storage for nodes, shared by a list and everything split off it.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    nodes: Vec<Node<T>>,
    /// Free list for reusing released node slots.
    free: Vec<Idx>,
}

impl<T> Arena<T> {
    pub fn new() -> Arena<T> {
        Arena {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Allocate a node with levels `0..=height`, every level unlinked.
    pub fn alloc(&mut self, value: Option<T>, height: usize) -> Idx {
        let node = Node::new(value, height);
        if let Some(idx) = self.free.pop() {
            trace!(idx, height, "reusing node slot");
            self.nodes[idx as usize] = node;
            return idx;
        }
        let idx = self.nodes.len() as Idx;
        assert!(idx != NULL, "node arena exhausted");
        self.nodes.push(node);
        idx
    }

    /// Return a slot to the free list, handing back whatever value it held.
    pub fn release(&mut self, idx: Idx) -> Option<T> {
        let node = &mut self.nodes[idx as usize];
        let value = node.value.take();
        node.links = SmallVec::new();
        self.free.push(idx);
        value
    }

    pub fn node(&self, idx: Idx) -> &Node<T> {
        &self.nodes[idx as usize]
    }

    pub fn node_mut(&mut self, idx: Idx) -> &mut Node<T> {
        &mut self.nodes[idx as usize]
    }

    pub fn link(&self, idx: Idx, level: usize) -> Link {
        self.node(idx).link(level)
    }

    pub fn set_link(&mut self, idx: Idx, level: usize, link: Link) {
        self.nodes[idx as usize].links[level] = link;
    }

    /// Number of slots currently holding a node.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of slots ever allocated, live or free.
    #[cfg(test)]
    pub fn slots(&self) -> usize {
        self.nodes.len()
    }
}
