use std::sync::RwLock;

use almoner_core::{DomainError, DomainResult, LotId, MovementId};
use almoner_stock::movement::Movement;
use almoner_stock::store::{MovementFilter, MovementStore};

/// In-memory append-only movement log.
///
/// Rows are only ever appended; there is no update and no delete, which is
/// what keeps quantity reconstruction sound. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    log: RwLock<Vec<Movement>>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MovementStore for InMemoryMovementStore {
    fn append(&self, movement: Movement) -> DomainResult<()> {
        let mut log = self
            .log
            .write()
            .map_err(|_| DomainError::storage("movement log lock poisoned"))?;
        if log.iter().any(|m| m.id_typed() == movement.id_typed()) {
            return Err(DomainError::conflict(format!(
                "movement {} already recorded",
                movement.id_typed()
            )));
        }
        log.push(movement);
        Ok(())
    }

    fn get(&self, id: MovementId) -> DomainResult<Movement> {
        let log = self
            .log
            .read()
            .map_err(|_| DomainError::storage("movement log lock poisoned"))?;
        log.iter()
            .find(|m| m.id_typed() == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("movement", id))
    }

    fn list(&self, filter: &MovementFilter) -> DomainResult<Vec<Movement>> {
        let log = self
            .log
            .read()
            .map_err(|_| DomainError::storage("movement log lock poisoned"))?;

        let mut movements: Vec<Movement> = log
            .iter()
            .filter(|m| filter.lot.is_none_or(|lot| m.lot_id() == lot))
            .filter(|m| filter.actor.is_none_or(|actor| m.actor() == actor))
            .filter(|m| filter.kind.is_none_or(|kind| m.kind() == kind))
            .filter(|m| filter.from.is_none_or(|from| m.recorded_at() >= from))
            .filter(|m| filter.until.is_none_or(|until| m.recorded_at() <= until))
            .cloned()
            .collect();

        movements.sort_by_key(|m| (m.recorded_at(), m.id_typed()));
        Ok(movements)
    }

    fn for_lot(&self, lot: LotId) -> DomainResult<Vec<Movement>> {
        let mut movements = self.list(&MovementFilter {
            lot: Some(lot),
            ..MovementFilter::default()
        })?;
        movements.reverse();
        Ok(movements)
    }

    fn count_for_lot(&self, lot: LotId) -> DomainResult<usize> {
        let log = self
            .log
            .read()
            .map_err(|_| DomainError::storage("movement log lock poisoned"))?;
        Ok(log.iter().filter(|m| m.lot_id() == lot).count())
    }
}
