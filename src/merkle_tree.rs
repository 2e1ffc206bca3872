use crate::{Sha256, TransactionId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Represents a SHA-256 hash of a Merkle tree node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleHash(Sha256);

impl MerkleHash {
    pub fn new(hash: Sha256) -> MerkleHash {
        Self(hash)
    }

    pub fn raw(&self) -> &Sha256 {
        &self.0
    }
}

/// Contains a logic to construct a Merkle tree.
pub struct MerkleTree;

impl MerkleTree {
    /// The Merkle root over the ids of committed transactions.
    /// A block without transactions has the all-zero root.
    pub fn merkle_root_from_transaction_ids(ids: &[&TransactionId]) -> MerkleHash {
        let leaves = ids
            .iter()
            .map(|id| id.as_str().as_bytes())
            .collect::<Vec<&[u8]>>();
        Self::merkle_root(&leaves)
    }

    pub fn merkle_root(leaves: &[&[u8]]) -> MerkleHash {
        if leaves.is_empty() {
            return MerkleHash::new(Sha256::zero());
        }
        let mut current_level_hashes = leaves
            .iter()
            .map(|leaf| Sha256::digest(leaf))
            .collect::<Vec<Sha256>>();

        while current_level_hashes.len() != 1 {
            if current_level_hashes.len() % 2 == 1 {
                // If a level has an odd number of nodes, duplicate the last node.
                let last = current_level_hashes[current_level_hashes.len() - 1];
                current_level_hashes.push(last);
            }

            current_level_hashes = current_level_hashes
                .chunks(2)
                .map(|pair| {
                    // Concatenate children's hashes.
                    let mut concat = pair[0].as_slice().to_vec();
                    concat.extend_from_slice(pair[1].as_slice());
                    // The concatenated hash is the value of the new parent node in the next level.
                    Sha256::digest(&concat)
                })
                .collect();
        }
        MerkleHash::new(current_level_hashes[0])
    }
}

impl Display for MerkleHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_zero_root() {
        assert_eq!(MerkleTree::merkle_root(&[]), MerkleHash::new(Sha256::zero()));
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let root = MerkleTree::merkle_root(&[&b"tx1"[..]]);
        assert_eq!(root, MerkleHash::new(Sha256::digest(b"tx1")));
    }

    #[test]
    fn odd_level_duplicates_last_node() {
        let a = Sha256::digest(b"a");
        let b = Sha256::digest(b"b");
        let c = Sha256::digest(b"c");
        let pair = |lhs: &Sha256, rhs: &Sha256| {
            let mut concat = lhs.as_slice().to_vec();
            concat.extend_from_slice(rhs.as_slice());
            Sha256::digest(&concat)
        };
        let expected = pair(&pair(&a, &b), &pair(&c, &c));
        assert_eq!(
            MerkleTree::merkle_root(&[&b"a"[..], &b"b"[..], &b"c"[..]]),
            MerkleHash::new(expected)
        );
    }

    #[test]
    fn root_from_transaction_ids() {
        let tx1 = TransactionId::new("tx1");
        let tx2 = TransactionId::new("tx2");
        assert_eq!(
            MerkleTree::merkle_root_from_transaction_ids(&[&tx1, &tx2]),
            MerkleTree::merkle_root(&[&b"tx1"[..], &b"tx2"[..]])
        );
        assert_ne!(
            MerkleTree::merkle_root_from_transaction_ids(&[&tx1, &tx2]),
            MerkleTree::merkle_root_from_transaction_ids(&[&tx2, &tx1])
        );
    }
}
