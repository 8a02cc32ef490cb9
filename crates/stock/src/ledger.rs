//! Ledger reconstruction and reconciliation.
//!
//! The movement ledger is the audit trail of every quantity change. Because
//! a lot's creation entry carries its initial fill, replaying all of a
//! lot's movements from zero must land exactly on its current quantity.

use almoner_core::{LotId, MovementId};

use crate::lot::Lot;
use crate::movement::Movement;

/// Fold a lot's movements in `recorded_at` order (ties broken by movement
/// id) and return the resulting quantity, starting from zero.
pub fn replay(movements: &[Movement]) -> i64 {
    let mut ordered: Vec<&Movement> = movements.iter().collect();
    ordered.sort_by_key(|m| (m.recorded_at(), m.id_typed()));
    ordered.iter().map(|m| m.signed_delta()).sum()
}

/// The lot quantity immediately before the movement `id` was applied,
/// obtained by replaying every earlier movement in `recorded_at` order.
///
/// Unlike [`Movement::quantity_before`], which walks one step back from the
/// lot's current quantity and is only exact for the newest movement, this
/// is correct for any movement in the history. Returns `None` when `id` is
/// not among `movements`.
pub fn quantity_before_movement(movements: &[Movement], id: MovementId) -> Option<i64> {
    let mut ordered: Vec<&Movement> = movements.iter().collect();
    ordered.sort_by_key(|m| (m.recorded_at(), m.id_typed()));

    let mut quantity = 0i64;
    for movement in ordered {
        if movement.id_typed() == id {
            return Some(quantity);
        }
        quantity += movement.signed_delta();
    }
    None
}

/// Outcome of checking a lot's state against its replayed ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub lot: LotId,
    /// Quantity obtained by replaying the ledger from zero.
    pub replayed: i64,
    /// Quantity the lot currently reports.
    pub current: u32,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.replayed == i64::from(self.current)
    }

    /// `replayed - current`; zero when consistent.
    pub fn divergence(&self) -> i64 {
        self.replayed - i64::from(self.current)
    }
}

/// Check that replaying `movements` reproduces `lot`'s current quantity.
///
/// The caller supplies every movement recorded for the lot; a filtered
/// slice reconciles against the wrong total.
pub fn reconcile(lot: &Lot, movements: &[Movement]) -> Reconciliation {
    Reconciliation {
        lot: lot.id_typed(),
        replayed: replay(movements),
        current: lot.current_quantity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::UnitOfMeasure;
    use crate::movement::MovementKind;
    use almoner_core::UserId;
    use chrono::{Duration, NaiveDate, Utc};

    fn lot(initial: u32) -> Lot {
        Lot::new(
            LotId::new(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            initial,
            UnitOfMeasure::Unit,
            None,
        )
        .unwrap()
    }

    fn movement_at(lot: &Lot, kind: MovementKind, quantity: u32, offset_secs: i64) -> Movement {
        Movement::new(
            MovementId::new(),
            lot.id_typed(),
            UserId::new(),
            kind,
            quantity,
            Utc::now() + Duration::seconds(offset_secs),
        )
        .unwrap()
    }

    #[test]
    fn replay_reproduces_applied_history() {
        let mut lot = lot(100);
        let history = vec![
            movement_at(&lot, MovementKind::Entry, 100, 0),
            movement_at(&lot, MovementKind::Exit, 30, 1),
            movement_at(&lot, MovementKind::AdjustLoss, 5, 2),
            movement_at(&lot, MovementKind::AdjustGain, 10, 3),
        ];
        for m in &history[1..] {
            lot.apply_delta(m.signed_delta()).unwrap();
        }

        let rec = reconcile(&lot, &history);
        assert_eq!(rec.replayed, 75);
        assert_eq!(rec.current, 75);
        assert!(rec.is_consistent());
        assert_eq!(rec.divergence(), 0);
    }

    #[test]
    fn replay_is_order_insensitive_in_input_but_ordered_in_time() {
        let lot = lot(20);
        let mut history = vec![
            movement_at(&lot, MovementKind::Entry, 20, 0),
            movement_at(&lot, MovementKind::Exit, 8, 5),
        ];
        history.reverse();
        assert_eq!(replay(&history), 12);
    }

    #[test]
    fn quantity_before_any_movement_via_replay() {
        let lot = lot(100);
        let history = vec![
            movement_at(&lot, MovementKind::Entry, 100, 0),
            movement_at(&lot, MovementKind::Exit, 30, 1),
            movement_at(&lot, MovementKind::AdjustGain, 10, 2),
            movement_at(&lot, MovementKind::AdjustLoss, 5, 3),
        ];
        let before: Vec<i64> = history
            .iter()
            .map(|m| quantity_before_movement(&history, m.id_typed()).unwrap())
            .collect();
        assert_eq!(before, vec![0, 100, 70, 80]);
        assert_eq!(
            quantity_before_movement(&history, MovementId::new()),
            None
        );
    }

    #[test]
    fn tampered_quantity_is_detected() {
        let lot = lot(50);
        // The exit is on the ledger but was never applied to the lot, as
        // if the quantity had been edited behind the mutator's back.
        let history = vec![
            movement_at(&lot, MovementKind::Entry, 50, 0),
            movement_at(&lot, MovementKind::Exit, 10, 1),
        ];
        let rec = reconcile(&lot, &history);
        assert!(!rec.is_consistent());
        assert_eq!(rec.divergence(), -10);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: applying any accepted movement sequence through
            /// the lot keeps `0 <= current <= initial` and keeps the
            /// ledger replay equal to the lot state.
            #[test]
            fn replay_matches_lot_state(
                initial in 1u32..=500,
                deltas in prop::collection::vec((any::<bool>(), 1u32..=120), 0..40)
            ) {
                let mut lot = lot(initial);
                let mut history = vec![movement_at(&lot, MovementKind::Entry, initial, 0)];

                for (i, (gain, qty)) in deltas.into_iter().enumerate() {
                    let kind = if gain { MovementKind::AdjustGain } else { MovementKind::Exit };
                    if lot.apply_delta(kind.signed(qty)).is_ok() {
                        history.push(movement_at(&lot, kind, qty, 1 + i as i64));
                    }
                    prop_assert!(lot.current_quantity() <= lot.initial_quantity());
                }

                let rec = reconcile(&lot, &history);
                prop_assert!(rec.is_consistent());
            }

            /// Property: `quantity_before` of the newest movement equals
            /// the lot quantity just before it was applied.
            #[test]
            fn quantity_before_walks_back_one_step(
                initial in 1u32..=500,
                take in 1u32..=500
            ) {
                prop_assume!(take <= initial);
                let mut lot = lot(initial);
                let exit = movement_at(&lot, MovementKind::Exit, take, 1);
                lot.apply_delta(exit.signed_delta()).unwrap();
                prop_assert_eq!(
                    exit.quantity_before(lot.current_quantity()),
                    i64::from(initial)
                );
            }
        }
    }
}
