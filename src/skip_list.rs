//! Indexable Skip List
//!
//! A sequence with `O(log n)` expected positional access, insertion, removal
//! and splitting. Every level record stores a *span*: the number of elements
//! its forward edge steps over. Summing spans while descending turns a search
//! by position into the usual skip list walk.
//!
//! ```text
//! Level 2: HEAD -----------(3)-----------> C ----------(3)-----------> NULL
//! Level 1: HEAD ----(2)----> B ----(1)---> C ----(2)----> E ---(1)---> NULL
//! Level 0: HEAD -(1)-> A -(1)-> B -(1)-> C -(1)-> D -(1)-> E -(1)----> NULL
//! ```
//!
//! # Span Semantics
//!
//! - `node.links[level].span` = elements between `node` (exclusive) and
//!   `node.links[level].next` (inclusive)
//! - Level 0 spans are always 1
//! - A `NULL` edge spans to one past the last element, so summing spans along
//!   any active level from the sentinel gives `len + 1`
//!
//! # Splitting
//!
//! [`SkipList::split_off`] cuts every level at the split point and hands the
//! suffix to a fresh sentinel without touching the nodes in between, so it
//! runs in `O(log n)` regardless of how many elements move. The two lists
//! keep sharing one node arena; each owns only the chain behind its own
//! sentinel.
//!
//! The shared arena never shrinks. Slots released by one list are recycled by
//! any list sharing the arena, but the arena itself lives until the last of
//! those lists is dropped, so a short tail split off a long list keeps the
//! long list's slot storage alive. Use [`Clone`] on the tail for a compact
//! copy with its own arena.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;
use tracing::instrument;
use tracing::trace;
use tracing::warn;

use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::level::GeometricLevels;
use crate::level::LevelSource;
use crate::node::Arena;
use crate::node::Idx;
use crate::node::Link;
use crate::node::NULL;

/// Position reached during a descent.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    node: Idx,
    /// Elements up to and including `node`; the sentinel has rank 0.
    rank: usize,
}

/// Walk the level-0 chain behind `head` in a borrowed arena.
fn chain<T>(arena: &Arena<T>, head: Idx) -> impl Iterator<Item = &T> {
    let mut idx = arena.node(head).next(0);
    std::iter::from_fn(move || {
        if idx == NULL {
            return None;
        }
        let node = arena.node(idx);
        idx = node.next(0);
        Some(node.value())
    })
}

/// A positional sequence backed by a skip list.
pub struct SkipList<T, L = GeometricLevels> {
    arena: Rc<RefCell<Arena<T>>>,
    /// The sentinel, logically at position -1.
    head: Idx,
    /// Highest level any element currently occupies.
    max_level: usize,
    len: usize,
    config: Config,
    levels: L,
}

impl<T> SkipList<T> {
    pub fn new() -> SkipList<T> {
        SkipList::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> SkipList<T> {
        let levels = GeometricLevels::from_config(&config);
        SkipList::with_level_source(config, levels)
    }
}

impl<T, L: LevelSource> SkipList<T, L> {
    /// Create an empty list drawing node heights from `levels`.
    pub fn with_level_source(config: Config, levels: L) -> SkipList<T, L> {
        let mut arena = Arena::new();
        let head = arena.alloc(None, config.max_height());
        SkipList {
            arena: Rc::new(RefCell::new(arena)),
            head,
            max_level: 0,
            len: 0,
            config,
            levels,
        }
    }

    // --- Insertion ---

    /// Insert `value` so that it ends up at `index`, shifting everything from
    /// `index` onwards one place to the right. `index == len()` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index, self.len + 1)?;
        self.insert_unchecked(index, value);
        Ok(())
    }

    pub fn push(&mut self, value: T) {
        self.insert_unchecked(self.len, value);
    }

    fn insert_unchecked(&mut self, index: usize, value: T) {
        let height = self.levels.draw().min(self.config.max_height());
        let mut arena = self.arena.borrow_mut();

        if height > self.max_level {
            // Levels coming back into use get a fresh edge to the end.
            for level in self.max_level + 1..=height {
                arena.set_link(self.head, level, Link { next: NULL, span: self.len + 1 });
            }
            trace!(from = self.max_level, to = height, "raising max level");
            self.max_level = height;
        }

        let new = arena.alloc(Some(value), height);
        let mut cursor = Cursor { node: self.head, rank: 0 };

        for level in (0..=self.max_level).rev() {
            Self::advance(&arena, &mut cursor, level, index);

            // The edge over the insertion point now steps over one more element.
            let mut link = arena.link(cursor.node, level);
            link.span += 1;

            if level <= height {
                let before = index + 1 - cursor.rank;
                arena.set_link(new, level, Link { next: link.next, span: link.span - before });
                link = Link { next: new, span: before };
            }
            arena.set_link(cursor.node, level, link);
        }

        self.len += 1;
        drop(arena);
        self.check_invariants();
    }

    // --- Splitting ---

    /// Split the list in two at `index`. Afterwards `self` holds elements
    /// `[0, index)` and the returned list holds `[index, len)`, in order.
    ///
    /// Runs in `O(log n)` expected time: only the edges crossing the split
    /// point are rewired, and the suffix moves over as a whole. The returned
    /// list shares this list's configuration and gets a forked level source.
    #[instrument(level = "debug", skip(self))]
    pub fn split_off(&mut self, index: usize) -> Result<SkipList<T, L>> {
        self.check_index(index, self.len + 1)?;
        let tail_len = self.len - index;

        let mut arena = self.arena.borrow_mut();
        let tail_head = arena.alloc(None, self.config.max_height());
        for level in 0..=self.config.max_height() {
            arena.set_link(tail_head, level, Link { next: NULL, span: tail_len + 1 });
        }

        let mut cursor = Cursor { node: self.head, rank: 0 };
        let mut head_top = None;
        let mut cut_level = None;

        for level in (0..=self.max_level).rev() {
            if Self::advance(&arena, &mut cursor, level, index) && head_top.is_none() {
                head_top = Some(level);
            }

            let link = arena.link(cursor.node, level);
            if link.next != NULL {
                if cut_level.is_none() {
                    cut_level = Some(level);
                }
                // The new sentinel sits at `index - 1`, rank 0 in the tail.
                arena.set_link(
                    tail_head,
                    level,
                    Link {
                        next: link.next,
                        span: cursor.rank + link.span - index,
                    },
                );
            }

            // The predecessor is now the last node of the head at this level.
            arena.set_link(cursor.node, level, Link { next: NULL, span: index + 1 - cursor.rank });
        }
        drop(arena);

        let head_top = head_top.unwrap_or(0);
        let cut_level = cut_level.unwrap_or(0);
        debug!(index, head_top, cut_level, tail_len, "split list");

        self.max_level = head_top;
        self.len = index;

        let tail = SkipList {
            arena: Rc::clone(&self.arena),
            head: tail_head,
            max_level: cut_level,
            len: tail_len,
            config: self.config,
            levels: self.levels.fork(),
        };

        self.check_invariants();
        tail.check_invariants();
        Ok(tail)
    }
}

impl<T, L> SkipList<T, L> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The highest level currently in use. 0 for an empty list.
    pub fn height(&self) -> usize {
        self.max_level
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- Search ---

    /// Move right along `level` for as long as the next node sits strictly
    /// before `index`. Returns whether the cursor moved.
    fn advance(arena: &Arena<T>, cursor: &mut Cursor, level: usize, index: usize) -> bool {
        let mut moved = false;
        loop {
            let link = arena.link(cursor.node, level);
            if link.next == NULL || cursor.rank + link.span > index {
                return moved;
            }
            cursor.rank += link.span;
            cursor.node = link.next;
            moved = true;
        }
    }

    /// The node immediately before `index`, or the sentinel when `index` is 0.
    fn find_predecessor(&self, arena: &Arena<T>, index: usize) -> Idx {
        let mut cursor = Cursor { node: self.head, rank: 0 };
        for level in (0..=self.max_level).rev() {
            Self::advance(arena, &mut cursor, level, index);
        }
        cursor.node
    }

    /// The node holding element `index`. Caller checks bounds.
    fn find_node(&self, arena: &Arena<T>, index: usize) -> Idx {
        let pred = self.find_predecessor(arena, index);
        arena.node(pred).next(0)
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<()> {
        if index >= bound {
            return Err(Error::OutOfRange { index, len: self.len });
        }
        Ok(())
    }

    // --- Access ---

    /// A copy of the element at `index`.
    pub fn get(&self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        self.check_index(index, self.len)?;
        let arena = self.arena.borrow();
        let idx = self.find_node(&arena, index);
        Ok(arena.node(idx).value().clone())
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.check_index(index, self.len)?;
        let mut arena = self.arena.borrow_mut();
        let idx = self.find_node(&arena, index);
        Ok(std::mem::replace(arena.node_mut(idx).value_mut(), value))
    }

    pub fn first(&self) -> Option<T>
    where
        T: Clone,
    {
        self.get(0).ok()
    }

    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.get(self.len.checked_sub(1)?).ok()
    }

    // --- Removal ---

    /// Remove and return the element at `index`, shifting everything after it
    /// one place to the left.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        self.check_index(index, self.len)?;
        let mut arena = self.arena.borrow_mut();

        let mut cursor = Cursor { node: self.head, rank: 0 };
        let mut target = NULL;

        for level in (0..=self.max_level).rev() {
            Self::advance(&arena, &mut cursor, level, index);

            let mut link = arena.link(cursor.node, level);
            link.span -= 1;

            if link.next != NULL && cursor.rank + link.span == index {
                // The next node is the one going away: absorb its edge.
                target = link.next;
                let removed = arena.link(target, level);
                link = Link {
                    next: removed.next,
                    span: link.span + removed.span,
                };

                if cursor.node == self.head && link.next == NULL && level > 0 {
                    trace!(from = self.max_level, to = level - 1, "lowering max level");
                    self.max_level = level - 1;
                }
            }
            arena.set_link(cursor.node, level, link);
        }

        let value = arena.release(target).expect("removed node carries a value");
        self.len -= 1;
        drop(arena);
        self.check_invariants();

        Ok(value)
    }

    pub fn pop(&mut self) -> Option<T> {
        let index = self.len.checked_sub(1)?;
        self.remove(index).ok()
    }

    /// Remove every element. The list keeps its configuration and level
    /// source.
    pub fn clear(&mut self) {
        let mut arena = self.arena.borrow_mut();
        let mut idx = arena.node(self.head).next(0);
        while idx != NULL {
            let next = arena.node(idx).next(0);
            arena.release(idx);
            idx = next;
        }
        for level in 0..=self.max_level {
            arena.set_link(self.head, level, Link { next: NULL, span: 1 });
        }
        self.max_level = 0;
        self.len = 0;
    }

    // --- Iteration ---

    /// Iterate over copies of the elements, front to back.
    pub fn iter(&self) -> Iter<'_, T, L>
    where
        T: Clone,
    {
        let current = self.arena.borrow().node(self.head).next(0);
        Iter {
            list: self,
            current,
            remaining: self.len,
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().collect()
    }

    // --- Invariant checking ---

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        use rustc_hash::FxHashMap;

        let arena = self.arena.borrow();

        // Rank of every node along the ownership chain.
        let mut ranks: FxHashMap<Idx, usize> = FxHashMap::default();
        ranks.insert(self.head, 0);
        let mut tallest = 0;
        let mut idx = arena.node(self.head).next(0);
        while idx != NULL {
            let node = arena.node(idx);
            assert_eq!(node.link(0).span, 1, "INVARIANT VIOLATED: level 0 span != 1");
            tallest = tallest.max(node.height());
            ranks.insert(idx, ranks.len());
            idx = node.next(0);
        }
        assert_eq!(
            ranks.len() - 1,
            self.len,
            "INVARIANT VIOLATED: chain length={} != len()={}",
            ranks.len() - 1,
            self.len
        );
        assert_eq!(
            tallest, self.max_level,
            "INVARIANT VIOLATED: tallest node={} != max_level={}",
            tallest, self.max_level
        );

        // Every active level must agree with the chain's ranks.
        for level in 0..=self.max_level {
            let mut idx = self.head;
            loop {
                let link = arena.link(idx, level);
                let rank = ranks[&idx];
                if link.next == NULL {
                    assert_eq!(
                        rank + link.span,
                        self.len + 1,
                        "INVARIANT VIOLATED: level {} does not end at len + 1",
                        level
                    );
                    break;
                }
                let next_rank = *ranks
                    .get(&link.next)
                    .expect("INVARIANT VIOLATED: link leaves the ownership chain");
                assert_eq!(
                    rank + link.span,
                    next_rank,
                    "INVARIANT VIOLATED: span at level {} disagrees with chain",
                    level
                );
                idx = link.next;
            }
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<T> Default for SkipList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L> Drop for SkipList<T, L> {
    fn drop(&mut self) {
        // Give back only what this list owns: its sentinel and level-0 chain.
        let Ok(mut arena) = self.arena.try_borrow_mut() else {
            warn!(head = self.head, len = self.len, "arena busy during drop, leaking list nodes");
            return;
        };
        let mut idx = self.head;
        while idx != NULL {
            let next = arena.node(idx).next(0);
            arena.release(idx);
            idx = next;
        }
    }
}

impl<T: Clone, L: LevelSource + Clone> Clone for SkipList<T, L> {
    /// A deep copy with its own arena.
    fn clone(&self) -> Self {
        let mut list = SkipList::with_level_source(self.config, self.levels.clone());
        list.extend(self.iter());
        list
    }
}

impl<T: fmt::Debug, L> fmt::Debug for SkipList<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.borrow();
        f.debug_list().entries(chain(&arena, self.head)).finish()
    }
}

impl<T: PartialEq, L, M> PartialEq<SkipList<T, M>> for SkipList<T, L> {
    fn eq(&self, other: &SkipList<T, M>) -> bool {
        if self.len != other.len {
            return false;
        }
        let ours = self.arena.borrow();
        let theirs = other.arena.borrow();
        chain(&ours, self.head).eq(chain(&theirs, other.head))
    }
}

impl<T: Eq, L> Eq for SkipList<T, L> {}

impl<T, L: LevelSource> Extend<T> for SkipList<T, L> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for SkipList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = SkipList::new();
        list.extend(iter);
        list
    }
}

/// Forward traversal yielding copies of the elements.
pub struct Iter<'a, T, L> {
    list: &'a SkipList<T, L>,
    current: Idx,
    remaining: usize,
}

impl<'a, T: Clone, L> Iterator for Iter<'a, T, L> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NULL {
            return None;
        }
        let arena = self.list.arena.borrow();
        let node = arena.node(self.current);
        let value = node.value().clone();
        self.current = node.next(0);
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Clone, L> ExactSizeIterator for Iter<'a, T, L> {}

impl<'a, T: Clone, L> IntoIterator for &'a SkipList<T, L> {
    type Item = T;
    type IntoIter = Iter<'a, T, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consuming traversal. Values are moved out of the nodes as it goes; the
/// emptied nodes are released when the iterator is dropped.
pub struct IntoIter<T, L> {
    list: SkipList<T, L>,
    current: Idx,
}

impl<T, L> Iterator for IntoIter<T, L> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NULL {
            return None;
        }
        let mut arena = self.list.arena.borrow_mut();
        let node = arena.node_mut(self.current);
        self.current = node.next(0);
        self.list.len -= 1;
        node.take_value()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T, L> ExactSizeIterator for IntoIter<T, L> {}

impl<T, L> IntoIterator for SkipList<T, L> {
    type Item = T;
    type IntoIter = IntoIter<T, L>;

    fn into_iter(self) -> Self::IntoIter {
        let current = self.arena.borrow().node(self.head).next(0);
        IntoIter { list: self, current }
    }
}
