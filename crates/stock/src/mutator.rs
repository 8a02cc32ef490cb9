//! Quantity mutator: the unit of concurrency control.
//!
//! Every quantity change in the system funnels through [`QuantityMutator::apply`],
//! which holds the lot's exclusive lock across the read-validate-write and
//! nothing else. Writing the matching ledger movement is the calling use
//! case's job, which keeps mutation and audit independently testable.

use tracing::{debug, warn};

use almoner_core::{DomainError, DomainResult, LotId};

use crate::store::LotStore;

/// Result of a successful quantity mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    pub lot: LotId,
    pub previous: u32,
    pub current: u32,
}

/// Applies signed deltas to single lots under exclusive access.
#[derive(Debug)]
pub struct QuantityMutator<S: LotStore> {
    lots: S,
}

impl<S: LotStore> QuantityMutator<S> {
    pub fn new(lots: S) -> Self {
        Self { lots }
    }

    /// Atomically apply `delta` to the lot's current quantity.
    ///
    /// Rejects results below zero (`InsufficientLotStock`) or above the
    /// lot's initial fill; the stored value is untouched on rejection.
    /// Concurrent calls against the same lot serialize: the outcome equals
    /// some sequential ordering of the same deltas.
    pub fn apply(&self, lot: LotId, delta: i64) -> DomainResult<QuantityChange> {
        let change = self.lots.update_exclusive(lot, |record, _items| {
            let previous = record.current_quantity();
            record.apply_delta(delta)?;
            Ok(QuantityChange {
                lot,
                previous,
                current: record.current_quantity(),
            })
        });

        match &change {
            Ok(c) => {
                debug!(%lot, delta, previous = c.previous, current = c.current, "lot quantity updated");
            }
            Err(DomainError::InsufficientLotStock { available, .. }) => {
                warn!(%lot, delta, available = *available, "rejected mutation below zero");
            }
            Err(DomainError::BusinessRule(rule)) => {
                warn!(%lot, delta, rule = %rule, "rejected mutation");
            }
            Err(_) => {}
        }

        change
    }
}
