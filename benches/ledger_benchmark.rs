use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use utxosim_lib::{
    Address, Coin, Ledger, LedgerParams, MempoolParams, OutPoint, OutputIndex, Transaction,
    TransactionId, TransactionInput, TransactionOutput,
};

const NUM_TRANSACTIONS: usize = 1_000;

fn create_ledger() -> Ledger {
    let mut ledger = Ledger::new(LedgerParams {
        mempool: MempoolParams {
            max_size: NUM_TRANSACTIONS,
        },
        batch_size: NUM_TRANSACTIONS,
        ..LedgerParams::default()
    });
    let allocation = (0..NUM_TRANSACTIONS)
        .map(|i| (Address::new(format!("owner-{}", i)), Coin::from(100)))
        .collect::<Vec<_>>();
    ledger.seed_genesis(&allocation);
    ledger
}

// Every transaction spends its own genesis output and pays a fee that depends on its index,
// so the commit has to reorder the whole mempool.
fn create_transactions() -> Vec<Transaction> {
    (0..NUM_TRANSACTIONS)
        .map(|i| {
            let owner = Address::new(format!("owner-{}", i));
            let outpoint = OutPoint::new(TransactionId::genesis(), OutputIndex::new(i as u32));
            let inputs = vec![TransactionInput::spending(outpoint, owner)];
            let outputs = vec![TransactionOutput::new(
                Coin::from(100 - (i % 10) as i64),
                Address::from("Receiver"),
            )];
            Transaction::new(TransactionId::new(format!("tx-{}", i)), inputs, outputs).unwrap()
        })
        .collect()
}

fn admit_benchmark(c: &mut Criterion) {
    let transactions = create_transactions();
    let mut group = c.benchmark_group("Mempool");
    group.throughput(Throughput::Elements(NUM_TRANSACTIONS as u64));
    group.bench_function("admit 1000 transactions", |b| {
        b.iter_batched(
            || (create_ledger(), transactions.clone()),
            |(mut ledger, transactions)| {
                for transaction in transactions {
                    black_box(ledger.submit(transaction).unwrap());
                }
                ledger
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn commit_benchmark(c: &mut Criterion) {
    let transactions = create_transactions();
    let miner = Address::from("Miner");
    let mut group = c.benchmark_group("Miner");
    group.throughput(Throughput::Elements(NUM_TRANSACTIONS as u64));
    group.bench_function("commit 1000 transactions", |b| {
        b.iter_batched(
            || {
                let mut ledger = create_ledger();
                for transaction in transactions.clone() {
                    ledger.submit(transaction).unwrap();
                }
                ledger
            },
            |mut ledger| {
                black_box(ledger.commit(&miner).report().num_transactions());
                ledger
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, admit_benchmark, commit_benchmark);

criterion_main!(benches);
