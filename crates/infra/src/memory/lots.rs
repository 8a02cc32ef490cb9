use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use almoner_core::{DomainError, DomainResult, LotId, ProductId};
use almoner_stock::lot::{Lot, LotItem};
use almoner_stock::store::{LotFilter, LotStore};

#[derive(Debug, Clone)]
struct LotRecord {
    lot: Lot,
    items: Vec<LotItem>,
}

/// In-memory lot store.
///
/// The map lock only guards record lookup; each lot record carries its own
/// mutex, which is the lot-scoped exclusive lock the engine relies on.
/// Distinct lots mutate fully in parallel. Intended for tests/dev; not
/// optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryLotStore {
    records: RwLock<HashMap<LotId, Arc<Mutex<LotRecord>>>>,
}

impl InMemoryLotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: LotId) -> DomainResult<Arc<Mutex<LotRecord>>> {
        let records = self
            .records
            .read()
            .map_err(|_| DomainError::storage("lot store lock poisoned"))?;
        records
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("lot", id))
    }

    fn check_items(lot: &Lot, items: &[LotItem]) -> DomainResult<()> {
        if let Some(stray) = items.iter().find(|i| i.lot_id() != lot.id_typed()) {
            return Err(DomainError::validation(format!(
                "item {} belongs to lot {}, not {}",
                stray.id_typed(),
                stray.lot_id(),
                lot.id_typed()
            )));
        }
        Ok(())
    }

    fn snapshot(&self) -> DomainResult<Vec<LotRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| DomainError::storage("lot store lock poisoned"))?;
        let handles: Vec<_> = records.values().cloned().collect();
        drop(records);

        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            let guard = handle
                .lock()
                .map_err(|_| DomainError::storage("lot record lock poisoned"))?;
            out.push(guard.clone());
        }
        Ok(out)
    }

    fn sort_fifo(lots: &mut [Lot]) {
        lots.sort_by_key(|l| (l.entry_date(), l.id_typed()));
    }
}

impl LotStore for InMemoryLotStore {
    fn insert(&self, lot: Lot, items: Vec<LotItem>) -> DomainResult<()> {
        Self::check_items(&lot, &items)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| DomainError::storage("lot store lock poisoned"))?;
        let id = lot.id_typed();
        if records.contains_key(&id) {
            return Err(DomainError::conflict(format!("lot {id} already exists")));
        }
        records.insert(id, Arc::new(Mutex::new(LotRecord { lot, items })));
        Ok(())
    }

    fn get(&self, id: LotId) -> DomainResult<Lot> {
        let record = self.record(id)?;
        let guard = record
            .lock()
            .map_err(|_| DomainError::storage("lot record lock poisoned"))?;
        Ok(guard.lot.clone())
    }

    fn items(&self, lot_id: LotId) -> DomainResult<Vec<LotItem>> {
        let record = self.record(lot_id)?;
        let guard = record
            .lock()
            .map_err(|_| DomainError::storage("lot record lock poisoned"))?;
        Ok(guard.items.clone())
    }

    fn update_exclusive<R, F>(&self, id: LotId, f: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Lot, &mut [LotItem]) -> DomainResult<R>,
    {
        let record = self.record(id)?;
        let mut guard = record
            .lock()
            .map_err(|_| DomainError::storage("lot record lock poisoned"))?;

        // Run the closure on a working copy and commit only on success, so
        // a rejected mutation leaves the record exactly as it was.
        let mut lot = guard.lot.clone();
        let mut items = guard.items.clone();
        let out = f(&mut lot, &mut items)?;
        guard.lot = lot;
        guard.items = items;
        Ok(out)
    }

    fn replace(&self, id: LotId, lot: Lot, items: Vec<LotItem>) -> DomainResult<()> {
        if lot.id_typed() != id {
            return Err(DomainError::validation(format!(
                "replacement lot carries id {}, expected {id}",
                lot.id_typed()
            )));
        }
        Self::check_items(&lot, &items)?;
        let record = self.record(id)?;
        let mut guard = record
            .lock()
            .map_err(|_| DomainError::storage("lot record lock poisoned"))?;
        *guard = LotRecord { lot, items };
        Ok(())
    }

    fn delete(&self, id: LotId) -> DomainResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| DomainError::storage("lot store lock poisoned"))?;
        // Dropping the record drops its items with it; nothing else holds
        // them.
        records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("lot", id))
    }

    fn list(&self, filter: &LotFilter) -> DomainResult<Vec<Lot>> {
        let search = filter.search.as_deref().map(str::to_lowercase);

        let mut lots: Vec<Lot> = self
            .snapshot()?
            .into_iter()
            .filter(|r| match filter.product {
                Some(product) => r.items.iter().any(|i| i.product_id() == product),
                None => true,
            })
            .filter(|r| match filter.entered_from {
                Some(from) => r.lot.entry_date() >= from,
                None => true,
            })
            .filter(|r| match filter.entered_until {
                Some(until) => r.lot.entry_date() <= until,
                None => true,
            })
            .filter(|r| !filter.with_stock || r.lot.has_stock())
            .filter(|r| match &search {
                Some(needle) => r
                    .lot
                    .observations()
                    .is_some_and(|obs| obs.to_lowercase().contains(needle)),
                None => true,
            })
            .map(|r| r.lot)
            .collect();

        Self::sort_fifo(&mut lots);
        Ok(lots)
    }

    fn lots_with_product_stock(&self, product: ProductId) -> DomainResult<Vec<Lot>> {
        let mut lots: Vec<Lot> = self
            .snapshot()?
            .into_iter()
            .filter(|r| {
                r.items
                    .iter()
                    .any(|i| i.product_id() == product && i.quantity() > 0)
            })
            .map(|r| r.lot)
            .collect();

        Self::sort_fifo(&mut lots);
        Ok(lots)
    }
}
