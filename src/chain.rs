use crate::{Block, BlockHash, CommitReport, Sha256};

/// Blocks committed since the ledger was created, oldest first.
#[derive(Debug, Default, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    pub fn new() -> Self {
        Self { blocks: vec![] }
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Height of the tip, 0 if nothing has been committed.
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    pub fn tip_hash(&self) -> BlockHash {
        self.tip()
            .map(|block| *block.id())
            .unwrap_or_else(|| BlockHash::new(Sha256::zero()))
    }

    /// Appends the block on top of the current tip.
    pub fn accept(&mut self, timestamp: i64, report: CommitReport) -> &Block {
        let block = Block::new(self.height() + 1, self.tip_hash(), timestamp, report);
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &Vec<Block> {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, Mempool, Miner, UtxoSet};

    fn empty_report() -> CommitReport {
        Miner::commit(
            &Address::from("Miner"),
            &mut Mempool::new(),
            &mut UtxoSet::new(),
            5,
        )
    }

    #[test]
    fn blocks_are_linked() {
        let mut blockchain = Blockchain::new();
        assert_eq!(blockchain.height(), 0);
        assert!(blockchain.tip().is_none());

        let first = blockchain.accept(1_000, empty_report()).clone();
        let second = blockchain.accept(1_000, empty_report()).clone();

        assert_eq!(blockchain.height(), 2);
        assert_eq!(first.header().height(), 1);
        assert_eq!(
            first.header().previous_block_hash(),
            &BlockHash::new(Sha256::zero())
        );
        assert_eq!(second.header().previous_block_hash(), first.id());
        assert_ne!(second.id(), first.id());
        assert_eq!(blockchain.tip_hash(), *second.id());
    }

    #[test]
    fn block_id_is_header_hash() {
        let mut blockchain = Blockchain::new();
        let block = blockchain.accept(42, empty_report());
        assert_eq!(block.header().hash(), *block.id());
        assert_eq!(block.header().timestamp(), 42);
    }
}
