//! AFL fuzz harness for the skip list.
//!
//! Decodes the input into a sequence of positional operations, applies them
//! to a pair of lists (plus whatever has been split off) and to `Vec` models,
//! and checks the contents agree after every step.

use afl::fuzz;
use indexed_skiplist::{Config, Error, SkipList};

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Insert { list: u8, pos_frac: u8, value: u8 },
    Remove { list: u8, pos_frac: u8 },
    Set { list: u8, pos_frac: u8, value: u8 },
    /// Split `list` and keep the tail as a new list.
    Split { list: u8, pos_frac: u8 },
    /// Append every element of `from` onto `to` and empty `from`.
    Join { from: u8, to: u8 },
    /// Index deliberately past the end.
    OutOfRange { list: u8, past: u8 },
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }

        let op_type = bytes[0] % 6;
        let rest = &bytes[1..];

        match op_type {
            0 if rest.len() >= 3 => Some((
                FuzzOp::Insert { list: rest[0], pos_frac: rest[1], value: rest[2] },
                &rest[3..],
            )),
            1 if rest.len() >= 2 => Some((FuzzOp::Remove { list: rest[0], pos_frac: rest[1] }, &rest[2..])),
            2 if rest.len() >= 3 => Some((
                FuzzOp::Set { list: rest[0], pos_frac: rest[1], value: rest[2] },
                &rest[3..],
            )),
            3 if rest.len() >= 2 => Some((FuzzOp::Split { list: rest[0], pos_frac: rest[1] }, &rest[2..])),
            4 if rest.len() >= 2 => Some((FuzzOp::Join { from: rest[0], to: rest[1] }, &rest[2..])),
            5 if rest.len() >= 2 => Some((FuzzOp::OutOfRange { list: rest[0], past: rest[1] }, &rest[2..])),
            _ => None,
        }
    }
}

/// Scale a byte onto `0..=bound`.
fn position(pos_frac: u8, bound: usize) -> usize {
    (pos_frac as usize * (bound + 1) / 256).min(bound)
}

/// Keep the number of live lists bounded.
const MAX_LISTS: usize = 8;

fn main() {
    fuzz!(|data: &[u8]| {
        let config = Config::new().with_seed(data.len() as u64);
        let mut lists: Vec<SkipList<u8>> = vec![SkipList::with_config(config)];
        let mut models: Vec<Vec<u8>> = vec![Vec::new()];
        let mut remaining = data;

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;

            match op {
                FuzzOp::Insert { list, pos_frac, value } => {
                    let k = list as usize % lists.len();
                    let index = position(pos_frac, models[k].len());
                    lists[k].insert(index, value).unwrap();
                    models[k].insert(index, value);
                }

                FuzzOp::Remove { list, pos_frac } => {
                    let k = list as usize % lists.len();
                    if !models[k].is_empty() {
                        let index = position(pos_frac, models[k].len() - 1);
                        assert_eq!(lists[k].remove(index), Ok(models[k].remove(index)));
                    }
                }

                FuzzOp::Set { list, pos_frac, value } => {
                    let k = list as usize % lists.len();
                    if !models[k].is_empty() {
                        let index = position(pos_frac, models[k].len() - 1);
                        let old = std::mem::replace(&mut models[k][index], value);
                        assert_eq!(lists[k].set(index, value), Ok(old));
                    }
                }

                FuzzOp::Split { list, pos_frac } => {
                    let k = list as usize % lists.len();
                    if lists.len() < MAX_LISTS {
                        let index = position(pos_frac, models[k].len());
                        let tail = lists[k].split_off(index).unwrap();
                        lists.push(tail);
                        let tail = models[k].split_off(index);
                        models.push(tail);
                    }
                }

                FuzzOp::Join { from, to } => {
                    let from = from as usize % lists.len();
                    let to = to as usize % lists.len();
                    if from != to {
                        let moved = lists[from].split_off(0).unwrap();
                        lists[to].extend(moved);
                        let moved = std::mem::take(&mut models[from]);
                        models[to].extend(moved);
                    }
                }

                FuzzOp::OutOfRange { list, past } => {
                    let k = list as usize % lists.len();
                    let len = models[k].len();
                    let index = len + past as usize;
                    assert_eq!(lists[k].get(index), Err(Error::OutOfRange { index, len }));
                    assert!(lists[k].split_off(index + 1).is_err());
                }
            }

            for (list, model) in lists.iter().zip(models.iter()) {
                assert_eq!(list.len(), model.len(), "Length mismatch");
            }
        }

        // CRITICAL INVARIANT: every list matches its model
        for (i, (list, model)) in lists.iter().zip(models.iter()).enumerate() {
            assert_eq!(&list.to_vec(), model, "List {} diverged from its model", i);
        }
    });
}
