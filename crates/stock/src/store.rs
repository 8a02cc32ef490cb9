//! Persistence boundary for lots, lot items and movements.
//!
//! The traits here are what the engine needs and nothing more: point reads,
//! filtered listings, and a lock-acquiring read-modify-write on a single
//! lot. The lot is the unit of mutual exclusion; implementations must
//! serialize concurrent [`LotStore::update_exclusive`] calls per lot while
//! letting distinct lots proceed in parallel.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use almoner_core::{DomainResult, LotId, MovementId, ProductId, UserId};

use crate::lot::{Lot, LotItem};
use crate::movement::{Movement, MovementKind};

/// Filter for lot listings. Empty filter matches every lot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotFilter {
    /// Only lots holding an item for this product (any quantity).
    pub product: Option<ProductId>,
    /// Entry date lower bound (inclusive).
    pub entered_from: Option<NaiveDate>,
    /// Entry date upper bound (inclusive).
    pub entered_until: Option<NaiveDate>,
    /// Only lots with `current_quantity > 0`.
    pub with_stock: bool,
    /// Case-insensitive substring match on observations.
    pub search: Option<String>,
}

/// Filter for movement listings. Empty filter matches every movement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    pub lot: Option<LotId>,
    pub actor: Option<UserId>,
    pub kind: Option<MovementKind>,
    /// Recorded-at lower bound (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Recorded-at upper bound (inclusive).
    pub until: Option<DateTime<Utc>>,
}

/// Store of lots and their item lines.
///
/// Items are indexed by lot id; they are not an owned collection inside the
/// lot. Deleting a lot deletes its items explicitly.
pub trait LotStore {
    /// Persist a new lot together with its item lines.
    fn insert(&self, lot: Lot, items: Vec<LotItem>) -> DomainResult<()>;

    /// Snapshot read of one lot.
    fn get(&self, id: LotId) -> DomainResult<Lot>;

    /// Snapshot read of one lot's item lines.
    fn items(&self, lot_id: LotId) -> DomainResult<Vec<LotItem>>;

    /// Exclusive read-validate-write on one lot and its items.
    ///
    /// The closure runs under the lot's lock; concurrent calls against the
    /// same lot are serialized and neither observes a stale value of the
    /// other. Keep the closure to the critical section: no store calls,
    /// no lookups through other collaborators.
    fn update_exclusive<R, F>(&self, id: LotId, f: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Lot, &mut [LotItem]) -> DomainResult<R>;

    /// Replace a lot and its items wholesale (pre-movement edits only;
    /// the guard lives in the use-case layer).
    fn replace(&self, id: LotId, lot: Lot, items: Vec<LotItem>) -> DomainResult<()>;

    /// Delete a lot and its dependent items.
    fn delete(&self, id: LotId) -> DomainResult<()>;

    /// Filtered listing, ordered ascending by `(entry_date, lot id)`.
    fn list(&self, filter: &LotFilter) -> DomainResult<Vec<Lot>>;

    /// Lots holding an item for `product` with item quantity > 0, ordered
    /// ascending by `(entry_date, lot id)`, the FIFO candidate order.
    fn lots_with_product_stock(&self, product: ProductId) -> DomainResult<Vec<Lot>>;
}

/// Append-only store of ledger movements.
///
/// There is deliberately no update and no delete: removing rows out of
/// order silently breaks quantity reconstruction.
pub trait MovementStore {
    fn append(&self, movement: Movement) -> DomainResult<()>;

    fn get(&self, id: MovementId) -> DomainResult<Movement>;

    /// Filtered listing, ordered ascending by `(recorded_at, movement id)`.
    fn list(&self, filter: &MovementFilter) -> DomainResult<Vec<Movement>>;

    /// All movements for one lot, newest first.
    fn for_lot(&self, lot: LotId) -> DomainResult<Vec<Movement>>;

    fn count_for_lot(&self, lot: LotId) -> DomainResult<usize>;

    fn any_for_lot(&self, lot: LotId) -> DomainResult<bool> {
        Ok(self.count_for_lot(lot)? > 0)
    }
}

impl<S: LotStore + ?Sized> LotStore for &S {
    fn insert(&self, lot: Lot, items: Vec<LotItem>) -> DomainResult<()> {
        (**self).insert(lot, items)
    }

    fn get(&self, id: LotId) -> DomainResult<Lot> {
        (**self).get(id)
    }

    fn items(&self, lot_id: LotId) -> DomainResult<Vec<LotItem>> {
        (**self).items(lot_id)
    }

    fn update_exclusive<R, F>(&self, id: LotId, f: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Lot, &mut [LotItem]) -> DomainResult<R>,
    {
        (**self).update_exclusive(id, f)
    }

    fn replace(&self, id: LotId, lot: Lot, items: Vec<LotItem>) -> DomainResult<()> {
        (**self).replace(id, lot, items)
    }

    fn delete(&self, id: LotId) -> DomainResult<()> {
        (**self).delete(id)
    }

    fn list(&self, filter: &LotFilter) -> DomainResult<Vec<Lot>> {
        (**self).list(filter)
    }

    fn lots_with_product_stock(&self, product: ProductId) -> DomainResult<Vec<Lot>> {
        (**self).lots_with_product_stock(product)
    }
}

impl<S: LotStore + ?Sized> LotStore for Arc<S> {
    fn insert(&self, lot: Lot, items: Vec<LotItem>) -> DomainResult<()> {
        (**self).insert(lot, items)
    }

    fn get(&self, id: LotId) -> DomainResult<Lot> {
        (**self).get(id)
    }

    fn items(&self, lot_id: LotId) -> DomainResult<Vec<LotItem>> {
        (**self).items(lot_id)
    }

    fn update_exclusive<R, F>(&self, id: LotId, f: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Lot, &mut [LotItem]) -> DomainResult<R>,
    {
        (**self).update_exclusive(id, f)
    }

    fn replace(&self, id: LotId, lot: Lot, items: Vec<LotItem>) -> DomainResult<()> {
        (**self).replace(id, lot, items)
    }

    fn delete(&self, id: LotId) -> DomainResult<()> {
        (**self).delete(id)
    }

    fn list(&self, filter: &LotFilter) -> DomainResult<Vec<Lot>> {
        (**self).list(filter)
    }

    fn lots_with_product_stock(&self, product: ProductId) -> DomainResult<Vec<Lot>> {
        (**self).lots_with_product_stock(product)
    }
}

impl<M: MovementStore + ?Sized> MovementStore for &M {
    fn append(&self, movement: Movement) -> DomainResult<()> {
        (**self).append(movement)
    }

    fn get(&self, id: MovementId) -> DomainResult<Movement> {
        (**self).get(id)
    }

    fn list(&self, filter: &MovementFilter) -> DomainResult<Vec<Movement>> {
        (**self).list(filter)
    }

    fn for_lot(&self, lot: LotId) -> DomainResult<Vec<Movement>> {
        (**self).for_lot(lot)
    }

    fn count_for_lot(&self, lot: LotId) -> DomainResult<usize> {
        (**self).count_for_lot(lot)
    }

    fn any_for_lot(&self, lot: LotId) -> DomainResult<bool> {
        (**self).any_for_lot(lot)
    }
}

impl<M: MovementStore + ?Sized> MovementStore for Arc<M> {
    fn append(&self, movement: Movement) -> DomainResult<()> {
        (**self).append(movement)
    }

    fn get(&self, id: MovementId) -> DomainResult<Movement> {
        (**self).get(id)
    }

    fn list(&self, filter: &MovementFilter) -> DomainResult<Vec<Movement>> {
        (**self).list(filter)
    }

    fn for_lot(&self, lot: LotId) -> DomainResult<Vec<Movement>> {
        (**self).for_lot(lot)
    }

    fn count_for_lot(&self, lot: LotId) -> DomainResult<usize> {
        (**self).count_for_lot(lot)
    }

    fn any_for_lot(&self, lot: LotId) -> DomainResult<bool> {
        (**self).any_for_lot(lot)
    }
}
