use crate::{Coin, Mempool, Transaction, TransactionInput, UtxoSet, ValidationError};
use std::collections::HashSet;

/// Responsible for checking a candidate transaction against the confirmed outputs and the
/// outputs that pending transactions already spend.
/// Validation has no side effects, the caller decides what to do with the result.
/// Note that this is a non-exhaustive list of checks, e.g. signatures are not verified.
pub struct TransactionValidator {}

impl TransactionValidator {
    /// Returns the fee of the transaction if it's valid.
    ///
    /// The checks run in a fixed order and stop at the first failure:
    ///   1. Each input, in declaration order, must be unique within the transaction,
    ///      exist in the UTXO set, not be spent by a mempool transaction, and be claimed by
    ///      its owner.
    ///   2. No output amount may be negative.
    ///   3. Inputs must cover outputs.
    pub fn validate(
        transaction: &Transaction,
        utxo_set: &UtxoSet,
        mempool: &Mempool,
    ) -> Result<Coin, ValidationError> {
        let input_total = Self::validate_inputs(transaction.inputs(), utxo_set, mempool)?;
        let output_total = match Self::validate_outputs(transaction)? {
            Some(output_total) => output_total,
            // Outputs beyond the representable range can't be covered by any inputs.
            None => {
                return Err(ValidationError::InsufficientFunds {
                    inputs: input_total,
                    outputs: transaction
                        .outputs()
                        .iter()
                        .fold(Coin::zero(), |total, output| {
                            total.saturating_add(output.amount())
                        }),
                })
            }
        };
        Self::compute_fee(input_total, output_total)
    }

    fn validate_inputs(
        inputs: &[TransactionInput],
        utxo_set: &UtxoSet,
        mempool: &Mempool,
    ) -> Result<Coin, ValidationError> {
        let mut seen = HashSet::new();
        let mut total = Coin::zero();
        for input in inputs {
            let outpoint = input.outpoint();
            if seen.contains(&outpoint) {
                return Err(ValidationError::DuplicateInputInTx(outpoint));
            }
            let entry = match utxo_set.get(&outpoint) {
                Some(entry) => entry,
                None => return Err(ValidationError::UnknownUtxo(outpoint)),
            };
            if mempool.is_reserved(&outpoint) {
                return Err(ValidationError::AlreadyReservedByPool(outpoint));
            }
            if entry.owner() != input.owner() {
                return Err(ValidationError::OwnerMismatch {
                    outpoint,
                    claimed: input.owner().clone(),
                    owner: entry.owner().clone(),
                });
            }
            total = total
                .checked_add(entry.amount())
                .ok_or(ValidationError::InputTotalOverflow(inputs.len()))?;
            seen.insert(outpoint);
        }
        Ok(total)
    }

    /// Returns the output total, or `None` if it overflows.
    /// Every amount is checked for its sign, even after the total has overflowed.
    fn validate_outputs(transaction: &Transaction) -> Result<Option<Coin>, ValidationError> {
        let mut total = Some(Coin::zero());
        for (index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(ValidationError::NegativeOutput {
                    index,
                    amount: output.amount(),
                });
            }
            total = total.and_then(|total| total.checked_add(output.amount()));
        }
        Ok(total)
    }

    fn compute_fee(input_total: Coin, output_total: Coin) -> Result<Coin, ValidationError> {
        if input_total < output_total {
            Err(ValidationError::InsufficientFunds {
                inputs: input_total,
                outputs: output_total,
            })
        } else {
            Ok((input_total - output_total).round_fee())
        }
    }
}
