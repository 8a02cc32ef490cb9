//! Stock use cases.
//!
//! Orchestrates the mutator, the FIFO engine and kit assembly, and writes
//! the movement ledger beside every quantity change. Every mutating use
//! case takes the acting user explicitly; nothing here reads identity from
//! ambient state.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use almoner_catalog::ProductCatalog;
use almoner_core::{DomainError, DomainResult, LotId, LotItemId, MovementId, ProductId, UserId};
use almoner_directory::UserDirectory;

use crate::kit::{KitAssembler, KitBuild};
use crate::ledger::{self, Reconciliation};
use crate::lot::{Lot, LotItem, UnitOfMeasure};
use crate::movement::{Movement, MovementKind};
use crate::mutator::{QuantityChange, QuantityMutator};
use crate::store::{LotFilter, LotStore, MovementFilter, MovementStore};

/// One item line of a lot to be received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLotItem {
    pub product: ProductId,
    pub quantity: u32,
    pub expiry_date: Option<NaiveDate>,
    pub size: Option<String>,
    pub voltage: Option<String>,
}

impl NewLotItem {
    pub fn new(product: ProductId, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            expiry_date: None,
            size: None,
            voltage: None,
        }
    }
}

/// A lot to be received into stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLot {
    pub entry_date: NaiveDate,
    pub unit: UnitOfMeasure,
    pub observations: Option<String>,
    pub items: Vec<NewLotItem>,
}

/// One line of a mixed donation intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationLine {
    pub product: ProductId,
    pub quantity: u32,
    pub expiry_date: Option<NaiveDate>,
    pub size: Option<String>,
    pub voltage: Option<String>,
    /// Unit for the lot created from this line; defaults to `Unit`.
    pub unit: Option<UnitOfMeasure>,
    pub note: Option<String>,
}

/// A mixed donation: several product lines received together, each landing
/// in its own lot so they deplete independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub entry_date: NaiveDate,
    pub general_note: Option<String>,
    pub lines: Vec<DonationLine>,
}

/// A freshly received lot with its entry movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedLot {
    pub lot: Lot,
    pub items: Vec<LotItem>,
    pub movement: Movement,
}

/// A recorded ledger movement with the quantity change it applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMovement {
    pub movement: Movement,
    pub change: QuantityChange,
}

/// A lot with its items and how often it has moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotDetail {
    pub lot: Lot,
    pub items: Vec<LotItem>,
    pub movement_count: usize,
}

/// A movement with the lot quantity around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementDetail {
    pub movement: Movement,
    pub quantity_before: i64,
    pub quantity_after: u32,
}

/// The stock use-case layer.
#[derive(Debug)]
pub struct StockService<S, M, C, U> {
    lots: S,
    movements: M,
    catalog: C,
    directory: U,
}

impl<S, M, C, U> StockService<S, M, C, U>
where
    S: LotStore,
    M: MovementStore,
    C: ProductCatalog,
    U: UserDirectory,
{
    pub fn new(lots: S, movements: M, catalog: C, directory: U) -> Self {
        Self {
            lots,
            movements,
            catalog,
            directory,
        }
    }

    /// Receive a donated lot into stock and record its entry movement.
    pub fn receive_lot(&self, new: NewLot, actor: UserId) -> DomainResult<ReceivedLot> {
        self.directory.lookup(actor)?;

        let lot_id = LotId::new();
        let (total, items) = self.build_items(lot_id, &new)?;
        let lot = Lot::new(lot_id, new.entry_date, total, new.unit, new.observations)?;

        info!(lot = %lot_id, total, items = items.len(), "receiving lot");

        self.lots.insert(lot.clone(), items.clone())?;

        let movement = Movement::new(
            MovementId::new(),
            lot_id,
            actor,
            MovementKind::Entry,
            total,
            Utc::now(),
        )?;
        self.movements.append(movement.clone())?;

        Ok(ReceivedLot {
            lot,
            items,
            movement,
        })
    }

    /// Mixed donation intake: one lot per line, sharing the entry date.
    ///
    /// Best-effort like every multi-step operation here: a failing line
    /// aborts the rest, lots already created stay created.
    pub fn receive_donation(
        &self,
        donation: Donation,
        actor: UserId,
    ) -> DomainResult<Vec<ReceivedLot>> {
        if donation.lines.is_empty() {
            return Err(DomainError::validation("donation has no lines"));
        }

        info!(lines = donation.lines.len(), "receiving mixed donation");

        let general_note = donation
            .general_note
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Quick intake");

        let mut received = Vec::with_capacity(donation.lines.len());
        for line in donation.lines {
            let observations = match line.note.as_deref().filter(|n| !n.trim().is_empty()) {
                Some(note) => format!("{general_note} | Detail: {note}"),
                None => general_note.to_string(),
            };

            let new = NewLot {
                entry_date: donation.entry_date,
                unit: line.unit.unwrap_or(UnitOfMeasure::Unit),
                observations: Some(observations),
                items: vec![NewLotItem {
                    product: line.product,
                    quantity: line.quantity,
                    expiry_date: line.expiry_date,
                    size: line.size,
                    voltage: line.voltage,
                }],
            };
            received.push(self.receive_lot(new, actor)?);
        }

        Ok(received)
    }

    /// Apply a movement to a lot: mutate the quantity, then append the
    /// ledger row.
    pub fn record_movement(
        &self,
        lot: LotId,
        kind: MovementKind,
        quantity: u32,
        actor: UserId,
    ) -> DomainResult<RecordedMovement> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "movement quantity must be greater than zero",
            ));
        }
        self.directory.lookup(actor)?;

        info!(%lot, %kind, quantity, "recording movement");

        let change = QuantityMutator::new(&self.lots).apply(lot, kind.signed(quantity))?;

        let movement = Movement::new(
            MovementId::new(),
            lot,
            actor,
            kind,
            quantity,
            Utc::now(),
        )?;
        self.movements.append(movement.clone())?;

        Ok(RecordedMovement { movement, change })
    }

    /// Replace an unmoved lot's contents. A lot whose quantities have
    /// already moved is history and cannot be rewritten.
    pub fn update_lot(&self, id: LotId, new: NewLot) -> DomainResult<(Lot, Vec<LotItem>)> {
        self.lots.get(id)?;
        if self.movements.any_for_lot(id)? {
            warn!(lot = %id, "rejected update of a moved lot");
            return Err(DomainError::lot_already_moved(id));
        }

        let (total, items) = self.build_items(id, &new)?;
        let lot = Lot::new(id, new.entry_date, total, new.unit, new.observations)?;
        self.lots.replace(id, lot.clone(), items.clone())?;

        info!(lot = %id, total, "lot updated");
        Ok((lot, items))
    }

    /// Delete an unmoved lot together with its items.
    pub fn delete_lot(&self, id: LotId) -> DomainResult<()> {
        self.lots.get(id)?;
        if self.movements.any_for_lot(id)? {
            warn!(lot = %id, "rejected deletion of a moved lot");
            return Err(DomainError::lot_already_moved(id));
        }
        self.lots.delete(id)?;
        info!(lot = %id, "lot deleted");
        Ok(())
    }

    /// Build `quantity` units of a kit product from its components.
    pub fn assemble_kit(
        &self,
        product: ProductId,
        quantity: u32,
        actor: UserId,
    ) -> DomainResult<KitBuild> {
        self.directory.lookup(actor)?;
        KitAssembler::new(&self.lots, &self.movements, &self.catalog).assemble(
            product,
            quantity,
            actor,
            Utc::now(),
        )
    }

    pub fn lot(&self, id: LotId) -> DomainResult<Lot> {
        self.lots.get(id)
    }

    pub fn lot_detail(&self, id: LotId) -> DomainResult<LotDetail> {
        let lot = self.lots.get(id)?;
        let items = self.lots.items(id)?;
        let movement_count = self.movements.count_for_lot(id)?;
        Ok(LotDetail {
            lot,
            items,
            movement_count,
        })
    }

    pub fn lots(&self, filter: &LotFilter) -> DomainResult<Vec<Lot>> {
        self.lots.list(filter)
    }

    /// Lots with remaining stock, oldest entry first.
    pub fn lots_with_stock(&self) -> DomainResult<Vec<Lot>> {
        self.lots.list(&LotFilter {
            with_stock: true,
            ..LotFilter::default()
        })
    }

    /// Lots with stock holding an item that expires within `days` days.
    pub fn lots_near_expiry(&self, days: u32) -> DomainResult<Vec<Lot>> {
        let deadline = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| DomainError::validation("expiry window out of range"))?;

        let mut near = Vec::new();
        for lot in self.lots_with_stock()? {
            let items = self.lots.items(lot.id_typed())?;
            if items
                .iter()
                .filter_map(LotItem::expiry_date)
                .any(|expiry| expiry < deadline)
            {
                near.push(lot);
            }
        }
        Ok(near)
    }

    pub fn movements(&self, filter: &MovementFilter) -> DomainResult<Vec<Movement>> {
        self.movements.list(filter)
    }

    /// A lot's movements, newest first.
    pub fn movements_for_lot(&self, lot: LotId) -> DomainResult<Vec<Movement>> {
        self.movements.for_lot(lot)
    }

    pub fn movement_detail(&self, id: MovementId) -> DomainResult<MovementDetail> {
        let movement = self.movements.get(id)?;
        let lot = self.lots.get(movement.lot_id())?;
        let quantity_after = lot.current_quantity();
        Ok(MovementDetail {
            quantity_before: movement.quantity_before(quantity_after),
            quantity_after,
            movement,
        })
    }

    /// Replay a lot's full ledger and compare it with the stored quantity.
    pub fn reconcile_lot(&self, id: LotId) -> DomainResult<Reconciliation> {
        let lot = self.lots.get(id)?;
        let movements = self.movements.for_lot(id)?;
        Ok(ledger::reconcile(&lot, &movements))
    }

    fn build_items(&self, lot_id: LotId, new: &NewLot) -> DomainResult<(u32, Vec<LotItem>)> {
        if new.items.is_empty() {
            return Err(DomainError::validation("lot has no items"));
        }

        let mut total: u32 = 0;
        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            self.catalog.lookup(line.product)?;

            let mut item =
                LotItem::new(LotItemId::new(), lot_id, line.product, line.quantity)?;
            if let Some(expiry) = line.expiry_date {
                item = item.with_expiry_date(expiry);
            }
            if let Some(size) = &line.size {
                item = item.with_size(size.clone());
            }
            if let Some(voltage) = &line.voltage {
                item = item.with_voltage(voltage.clone());
            }

            total = total.checked_add(line.quantity).ok_or_else(|| {
                DomainError::validation("lot total quantity overflows")
            })?;
            items.push(item);
        }

        Ok((total, items))
    }
}
