//! Partial merkle tree reconstruction
//!
//! The tree is shape-only: `levels[d][i]` is the slot at depth `d`, index
//! `i`, with depth 0 the root and depth `max_depth` the leaves. Nodes carry
//! no links; a child of `(d, i)` is `(d + 1, 2i)` or `(d + 1, 2i + 1)`.
//!
//! `populate` walks the tree depth-first from the root, driven by a flag
//! stream and a hash stream. A set flag on an internal node means "descend
//! and compute", a clear flag means "the next hash is this subtree's hash".
//! Leaves always take the next hash; their flag marks a matched transaction.
//! All hashes are in internal byte order.

use crate::error::{Result, SpvError};
use crate::hashing::merkle_parent;
use crate::types::Hash;
use std::fmt;
use tracing::{debug, warn};

/// Position of the walker: `(depth, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub depth: usize,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct MerkleTree {
    total: usize,
    max_depth: usize,
    levels: Vec<Vec<Option<Hash>>>,
    cursor: Cursor,
    matched: Vec<usize>,
}

impl MerkleTree {
    /// Empty tree for `total` leaves.
    pub fn new(total: usize) -> Result<Self> {
        if total == 0 {
            return Err(SpvError::InconsistentProof(
                "merkle tree needs at least one leaf".to_string(),
            ));
        }
        // ceil(log2(total))
        let max_depth = (usize::BITS - (total - 1).leading_zeros()) as usize;
        let levels = (0..=max_depth)
            .map(|depth| vec![None; level_size(total, max_depth, depth)])
            .collect();

        Ok(Self {
            total,
            max_depth,
            levels,
            cursor: Cursor { depth: 0, index: 0 },
            matched: Vec::new(),
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(Vec::len).collect()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn root(&self) -> Option<Hash> {
        self.levels[0][0]
    }

    pub fn node(&self, depth: usize, index: usize) -> Option<Hash> {
        self.levels.get(depth)?.get(index).copied().flatten()
    }

    /// Leaf indices whose flag bit was set during `populate`.
    pub fn matched_leaves(&self) -> &[usize] {
        &self.matched
    }

    pub fn up(&mut self) {
        self.cursor.depth = self.cursor.depth.saturating_sub(1);
        self.cursor.index /= 2;
    }

    /// Move to the left child. No-op at a leaf.
    pub fn left(&mut self) {
        if !self.is_leaf() {
            self.cursor.depth += 1;
            self.cursor.index *= 2;
        }
    }

    /// Move to the right child. No-op at a leaf.
    pub fn right(&mut self) {
        if !self.is_leaf() {
            self.cursor.depth += 1;
            self.cursor.index = self.cursor.index * 2 + 1;
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.cursor.depth == self.max_depth
    }

    pub fn right_exists(&self) -> bool {
        self.levels
            .get(self.cursor.depth + 1)
            .map_or(false, |level| self.cursor.index * 2 + 1 < level.len())
    }

    fn set_current(&mut self, hash: Hash) {
        self.levels[self.cursor.depth][self.cursor.index] = Some(hash);
    }

    fn left_child(&self) -> Option<Hash> {
        self.node(self.cursor.depth + 1, self.cursor.index * 2)
    }

    fn right_child(&self) -> Option<Hash> {
        self.node(self.cursor.depth + 1, self.cursor.index * 2 + 1)
    }

    /// Reconstruct the root from a flag stream and a hash stream.
    ///
    /// Both streams are consumed front to back. Once the root is known,
    /// every hash must have been used and every leftover flag must be clear
    /// (byte padding); anything else, or running dry before the root is
    /// known, is an `InconsistentProof`.
    ///
    /// The walk always starts at the root, wherever the cursor was left.
    pub fn populate<F, H>(&mut self, flag_bits: F, hashes: H) -> Result<()>
    where
        F: IntoIterator<Item = bool>,
        H: IntoIterator<Item = Hash>,
    {
        if self.root().is_some() {
            return Err(SpvError::InconsistentProof(
                "merkle tree already populated".to_string(),
            ));
        }
        self.cursor = Cursor { depth: 0, index: 0 };
        self.matched.clear();
        for level in &mut self.levels {
            level.iter_mut().for_each(|slot| *slot = None);
        }

        let mut flags = flag_bits.into_iter();
        let mut hashes = hashes.into_iter();
        let mut flags_used = 0usize;
        let mut hashes_used = 0usize;

        while self.root().is_none() {
            if self.is_leaf() {
                let flag = next_or_fail(&mut flags, "flag bits", &mut flags_used)?;
                if flag {
                    self.matched.push(self.cursor.index);
                }
                let hash = next_or_fail(&mut hashes, "hashes", &mut hashes_used)?;
                self.set_current(hash);
                self.up();
                continue;
            }

            match self.left_child() {
                None => {
                    if next_or_fail(&mut flags, "flag bits", &mut flags_used)? {
                        self.left();
                    } else {
                        let hash = next_or_fail(&mut hashes, "hashes", &mut hashes_used)?;
                        self.set_current(hash);
                        self.up();
                    }
                }
                Some(left) if self.right_exists() => match self.right_child() {
                    None => self.right(),
                    Some(right) => {
                        self.set_current(merkle_parent(&left, &right));
                        self.up();
                    }
                },
                Some(left) => {
                    self.set_current(merkle_parent(&left, &left));
                    self.up();
                }
            }
        }

        let leftover_hashes = hashes.count();
        if leftover_hashes > 0 {
            warn!(leftover_hashes, hashes_used, "unconsumed hashes in merkle proof");
            return Err(SpvError::InconsistentProof(format!(
                "{} hashes left unconsumed",
                leftover_hashes
            )));
        }
        if flags.any(|bit| bit) {
            warn!(flags_used, "set flag bits left unconsumed in merkle proof");
            return Err(SpvError::InconsistentProof(
                "set flag bits left unconsumed".to_string(),
            ));
        }

        debug!(
            total = self.total,
            flags_used,
            hashes_used,
            matched = self.matched.len(),
            "merkle tree populated"
        );
        Ok(())
    }
}

fn level_size(total: usize, max_depth: usize, depth: usize) -> usize {
    let shift = max_depth - depth;
    (total + (1 << shift) - 1) >> shift
}

fn next_or_fail<T>(
    iter: &mut impl Iterator<Item = T>,
    what: &str,
    used: &mut usize,
) -> Result<T> {
    match iter.next() {
        Some(item) => {
            *used += 1;
            Ok(item)
        }
        None => {
            warn!(consumed = *used, "merkle proof ran out of {}", what);
            Err(SpvError::InconsistentProof(format!(
                "ran out of {} after {}",
                what, used
            )))
        }
    }
}

impl fmt::Display for MerkleTree {
    /// One line per level; unknown slots print as `None`, the cursor slot
    /// is wrapped in `*`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, level) in self.levels.iter().enumerate() {
            if depth > 0 {
                writeln!(f)?;
            }
            let items: Vec<String> = level
                .iter()
                .enumerate()
                .map(|(index, slot)| {
                    let label = match slot {
                        Some(hash) => format!("{}...", &hex::encode(hash)[..8]),
                        None => "None".to_string(),
                    };
                    if self.cursor == (Cursor { depth, index }) {
                        format!("*{}*", label)
                    } else {
                        label
                    }
                })
                .collect();
            write!(f, "{}", items.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Hash {
        let mut out = [0u8; 32];
        out.copy_from_slice(&hex::decode(s).unwrap());
        out
    }

    fn five_leaves() -> Vec<Hash> {
        vec![
            h("42f6f52f17620653dcc909e58bb352e0bd4bd1381e2955d19c00959a22122b2e"),
            h("94c3af34b9667bf787e1c6a0a009201589755d01d02fe2877cc69b929d2418d4"),
            h("959428d7c48113cb9149d0566bde3d46e98cf028053c522b8fa8f735241aa953"),
            h("a9f27b99d5d108dede755710d4a1ffa2c74af70b4ca71726fa57d68454e609a2"),
            h("62af110031e29de1efcad103b3ad4bec7bdcf6cb9c9f4afdd586981795516577"),
        ]
    }

    #[test]
    fn test_shape() {
        let tree = MerkleTree::new(9).unwrap();
        assert_eq!(tree.max_depth(), 4);
        assert_eq!(tree.level_sizes(), vec![1, 2, 3, 5, 9]);

        let tree = MerkleTree::new(16).unwrap();
        assert_eq!(tree.level_sizes(), vec![1, 2, 4, 8, 16]);

        let tree = MerkleTree::new(1).unwrap();
        assert_eq!(tree.max_depth(), 0);
        assert_eq!(tree.level_sizes(), vec![1]);

        let tree = MerkleTree::new(3519).unwrap();
        assert_eq!(tree.max_depth(), 12);
        assert_eq!(*tree.level_sizes().last().unwrap(), 3519);
    }

    #[test]
    fn test_zero_total() {
        assert!(matches!(
            MerkleTree::new(0),
            Err(SpvError::InconsistentProof(_))
        ));
    }

    #[test]
    fn test_navigation() {
        let mut tree = MerkleTree::new(5).unwrap();
        assert!(!tree.is_leaf());
        tree.right();
        assert_eq!(tree.cursor(), Cursor { depth: 1, index: 1 });
        // level 2 has 2 slots: index 3 does not exist
        assert!(!tree.right_exists());
        tree.left();
        assert_eq!(tree.cursor(), Cursor { depth: 2, index: 2 });
        assert!(!tree.right_exists());
        tree.left();
        assert!(tree.is_leaf());
        tree.up();
        tree.up();
        tree.up();
        assert_eq!(tree.cursor(), Cursor { depth: 0, index: 0 });
        tree.up();
        assert_eq!(tree.cursor(), Cursor { depth: 0, index: 0 });
    }

    #[test]
    fn test_navigation_stops_at_leaves() {
        let mut tree = MerkleTree::new(5).unwrap();
        for _ in 0..6 {
            tree.left();
        }
        assert_eq!(tree.cursor(), Cursor { depth: 3, index: 0 });
        tree.right();
        assert_eq!(tree.cursor(), Cursor { depth: 3, index: 0 });
    }

    #[test]
    fn test_populate_starts_at_root_after_navigation() {
        let mut tree = MerkleTree::new(5).unwrap();
        for _ in 0..4 {
            tree.left();
        }
        tree.populate(vec![false; 8], vec![[1u8; 32]]).unwrap();
        assert_eq!(tree.root(), Some([1u8; 32]));
        assert_eq!(tree.node(3, 0), None);

        let mut tree = MerkleTree::new(5).unwrap();
        tree.right();
        tree.left();
        tree.populate(vec![true; 11], five_leaves()).unwrap();
        assert_eq!(
            hex::encode(tree.root().unwrap()),
            "a8e8bd023169b81bc56854137a135b97ef47a6a7237f4c6e037baed16285a5ab"
        );
    }

    #[test]
    fn test_populate_five_leaves_all_flags() {
        let mut tree = MerkleTree::new(5).unwrap();
        tree.populate(vec![true; 11], five_leaves()).unwrap();
        assert_eq!(
            hex::encode(tree.root().unwrap()),
            "a8e8bd023169b81bc56854137a135b97ef47a6a7237f4c6e037baed16285a5ab"
        );
        assert_eq!(tree.matched_leaves(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_populate_partial() {
        let leaves = five_leaves();
        let l2_0 = merkle_parent(&leaves[0], &leaves[1]);
        let l2_2 = merkle_parent(&leaves[4], &leaves[4]);
        let l1_1 = merkle_parent(&l2_2, &l2_2);

        let flags = [true, true, false, true, false, true, false, false];
        let mut tree = MerkleTree::new(5).unwrap();
        tree.populate(flags, vec![l2_0, leaves[2], leaves[3], l1_1])
            .unwrap();
        assert_eq!(
            hex::encode(tree.root().unwrap()),
            "a8e8bd023169b81bc56854137a135b97ef47a6a7237f4c6e037baed16285a5ab"
        );
        assert_eq!(tree.matched_leaves(), &[3]);
        assert_eq!(tree.node(3, 3), Some(leaves[3]));
        assert_eq!(tree.node(3, 0), None);
    }

    #[test]
    fn test_populate_root_hash_supplied_directly() {
        let root = [9u8; 32];
        let mut tree = MerkleTree::new(7).unwrap();
        tree.populate([false], [root]).unwrap();
        assert_eq!(tree.root(), Some(root));
        assert!(tree.matched_leaves().is_empty());
    }

    #[test]
    fn test_populate_single_leaf() {
        let leaf = [5u8; 32];
        let mut tree = MerkleTree::new(1).unwrap();
        tree.populate([true, false, false], [leaf]).unwrap();
        assert_eq!(tree.root(), Some(leaf));
        assert_eq!(tree.matched_leaves(), &[0]);
    }

    #[test]
    fn test_populate_leftover_hash() {
        let mut leaves = five_leaves();
        leaves.push([0u8; 32]);
        let mut tree = MerkleTree::new(5).unwrap();
        assert!(matches!(
            tree.populate(vec![true; 11], leaves),
            Err(SpvError::InconsistentProof(_))
        ));
    }

    #[test]
    fn test_populate_leftover_set_flag() {
        let mut flags = vec![true; 11];
        flags.extend([false, true]);
        let mut tree = MerkleTree::new(5).unwrap();
        assert!(matches!(
            tree.populate(flags, five_leaves()),
            Err(SpvError::InconsistentProof(_))
        ));
    }

    #[test]
    fn test_populate_zero_padding_accepted() {
        let mut flags = vec![true; 11];
        flags.extend([false; 5]);
        let mut tree = MerkleTree::new(5).unwrap();
        assert!(tree.populate(flags, five_leaves()).is_ok());
    }

    #[test]
    fn test_populate_runs_out_of_hashes() {
        let mut tree = MerkleTree::new(5).unwrap();
        let mut leaves = five_leaves();
        leaves.pop();
        assert!(matches!(
            tree.populate(vec![true; 11], leaves),
            Err(SpvError::InconsistentProof(_))
        ));
    }

    #[test]
    fn test_populate_runs_out_of_flags() {
        let mut tree = MerkleTree::new(5).unwrap();
        assert!(matches!(
            tree.populate(vec![true; 4], five_leaves()),
            Err(SpvError::InconsistentProof(_))
        ));
    }

    #[test]
    fn test_populate_twice_rejected() {
        let mut tree = MerkleTree::new(5).unwrap();
        tree.populate(vec![true; 11], five_leaves()).unwrap();
        assert!(tree.populate(vec![true; 11], five_leaves()).is_err());
    }

    #[test]
    fn test_display() {
        let mut tree = MerkleTree::new(3).unwrap();
        assert_eq!(tree.to_string(), "*None*\nNone, None\nNone, None, None");
        tree.populate([false], [[0xab; 32]]).unwrap();
        assert_eq!(tree.to_string(), "*abababab...*\nNone, None\nNone, None, None");
    }
}
