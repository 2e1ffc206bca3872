use crate::{CommitReport, MerkleHash, MerkleTree, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A block hash that identifies the committed batch, and implicitly all batches before it.
#[derive(Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct BlockHash(Sha256);

impl BlockHash {
    pub fn new(hash: Sha256) -> Self {
        Self(hash)
    }

    pub fn as_sha256(&self) -> &Sha256 {
        &self.0
    }
}

impl Display for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

/// Block header represents the metadata of the committed batch.
/// There is no proof of work, so there is no difficulty target or nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    // The number of the block, the first committed block has height 1.
    height: u64,
    // A reference to the hash of the previous block, all zeroes for the first block.
    previous_block_hash: BlockHash,
    // A hash of the root of the Merkle tree of this block's transaction ids.
    merkle_root: MerkleHash,
    // Seconds from Unix Epoch at which the batch was committed.
    timestamp: i64,
}

impl BlockHeader {
    pub fn new(
        height: u64,
        previous_block_hash: BlockHash,
        merkle_root: MerkleHash,
        timestamp: i64,
    ) -> Self {
        Self {
            height,
            previous_block_hash,
            merkle_root,
            timestamp,
        }
    }

    pub fn hash(&self) -> BlockHash {
        // The header is serialized as:
        //   - 8 bytes for height
        //   - 32 bytes for previous block hash
        //   - 32 bytes for merkle root
        //   - 8 bytes for timestamp
        // Integers use the little-endian format, so the hash doesn't depend on the platform.
        let mut data = Vec::with_capacity(80);
        data.extend_from_slice(&self.height.to_le_bytes());
        data.extend_from_slice(self.previous_block_hash.as_sha256().as_slice());
        data.extend_from_slice(self.merkle_root.raw().as_slice());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        // Hash the block header twice.
        BlockHash::new(Sha256::double_digest(&data))
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn previous_block_hash(&self) -> &BlockHash {
        &self.previous_block_hash
    }

    pub fn merkle_root(&self) -> &MerkleHash {
        &self.merkle_root
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// A committed batch of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    // Block hash that is equivalent to `header.hash()`.
    id: BlockHash,
    header: BlockHeader,
    report: CommitReport,
}

impl Block {
    pub fn new(
        height: u64,
        previous_block_hash: BlockHash,
        timestamp: i64,
        report: CommitReport,
    ) -> Self {
        let merkle_root = MerkleTree::merkle_root_from_transaction_ids(&report.transaction_ids());
        let header = BlockHeader::new(height, previous_block_hash, merkle_root, timestamp);
        Self {
            id: header.hash(),
            header,
            report,
        }
    }

    pub fn id(&self) -> &BlockHash {
        &self.id
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn report(&self) -> &CommitReport {
        &self.report
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} ({} transactions, {} to {})",
            self.header.height,
            self.id,
            self.report.num_transactions(),
            self.report.total_fees(),
            self.report.miner()
        )
    }
}
