//! An indexable sequence built on a skip list.
//!
//! Positional `get`, `set`, `insert` and `remove` run in `O(log n)` expected
//! time, and [`SkipList::split_off`] partitions a list in two in `O(log n)`
//! by rewiring the shortcut edges that cross the split point.
//!
//! # Quick Start
//!
//! ```
//! use indexed_skiplist::SkipList;
//!
//! let mut list: SkipList<_> = vec![10, 20, 30, 40, 50].into_iter().collect();
//! assert_eq!(list.get(2), Ok(30));
//!
//! list.insert(2, 99).unwrap();
//! assert_eq!(list.remove(0), Ok(10));
//!
//! let tail = list.split_off(2).unwrap();
//! assert_eq!(list.to_vec(), vec![20, 99]);
//! assert_eq!(tail.to_vec(), vec![30, 40, 50]);
//! ```
//!
//! Lists are single-threaded: they share their node arena with every list
//! split off from them through an `Rc`. That arena is never shrunk: it keeps
//! every slot it has ever allocated until the last list sharing it is
//! dropped. Released slots are reused by later insertions into any of those
//! lists. Clone a small list split off a large one to give it a compact arena
//! of its own.

pub mod config;
pub mod error;
pub mod level;
mod node;
pub mod skip_list;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use level::GeometricLevels;
pub use level::LevelSource;
pub use level::ScriptedLevels;
pub use skip_list::SkipList;
