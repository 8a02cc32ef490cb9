//! FIFO consumption engine: oldest lots are depleted first.

use tracing::{debug, error, info};

use almoner_core::{DomainError, DomainResult, LotId, ProductId};

use crate::store::LotStore;

/// How much one consumption call took from one lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotDraw {
    pub lot: LotId,
    pub taken: u32,
}

/// Depletes a product's stock across lots, oldest entry date first.
#[derive(Debug)]
pub struct FifoConsumer<S: LotStore> {
    lots: S,
}

impl<S: LotStore> FifoConsumer<S> {
    pub fn new(lots: S) -> Self {
        Self { lots }
    }

    /// Consume `quantity_needed` units of `product` from the oldest
    /// eligible lots.
    ///
    /// Candidate lots are ordered by entry date, ties broken by lot id, so
    /// consumption order is deterministic. Each lot is drained inside its
    /// own exclusive critical section: the item line and the lot quantity
    /// drop together. A candidate whose stock vanished between listing and
    /// locking contributes nothing and is skipped.
    ///
    /// Not atomic across lots: when every candidate is exhausted and
    /// demand remains, the call fails with the remaining shortfall and the
    /// draws already applied stay applied. Callers needing all-or-nothing
    /// must compensate themselves.
    pub fn consume(
        &self,
        product: ProductId,
        quantity_needed: u32,
    ) -> DomainResult<Vec<LotDraw>> {
        if quantity_needed == 0 {
            return Err(DomainError::validation(
                "consumption quantity must be greater than zero",
            ));
        }

        info!(%product, quantity_needed, "consuming product stock");

        let candidates = self.lots.lots_with_product_stock(product)?;

        let mut needed = quantity_needed;
        let mut draws = Vec::new();

        for candidate in candidates {
            if needed == 0 {
                break;
            }
            let lot_id = candidate.id_typed();

            let taken = self.lots.update_exclusive(lot_id, |lot, items| {
                let Some(item) = items
                    .iter_mut()
                    .find(|i| i.product_id() == product && i.quantity() > 0)
                else {
                    return Ok(0);
                };

                let take = item.quantity().min(needed);
                item.consume(take)?;
                lot.apply_delta(-i64::from(take))?;
                Ok(take)
            })?;

            if taken > 0 {
                debug!(%product, lot = %lot_id, taken, "consumed from lot");
                draws.push(LotDraw {
                    lot: lot_id,
                    taken,
                });
                needed -= taken;
            }
        }

        if needed > 0 {
            error!(%product, quantity_needed, shortfall = needed, "stock exhausted");
            return Err(DomainError::InsufficientProductStock {
                product,
                shortfall: needed,
            });
        }

        info!(%product, lots = draws.len(), "product stock consumed");
        Ok(draws)
    }
}
