use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use almoner_core::{DomainError, DomainResult, Entity, LotId, MovementId, UserId};

/// What a ledger movement did to its lot's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods entered the lot (donation intake, kit assembly output).
    Entry,
    /// Goods left the lot (distribution).
    Exit,
    /// Stock count corrected upward.
    AdjustGain,
    /// Stock count corrected downward (damage, loss).
    AdjustLoss,
}

impl MovementKind {
    /// Sign convention: entries and gains add, exits and losses subtract.
    pub fn signed(self, quantity: u32) -> i64 {
        match self {
            MovementKind::Entry | MovementKind::AdjustGain => i64::from(quantity),
            MovementKind::Exit | MovementKind::AdjustLoss => -i64::from(quantity),
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MovementKind::Entry => write!(f, "entry"),
            MovementKind::Exit => write!(f, "exit"),
            MovementKind::AdjustGain => write!(f, "adjust_gain"),
            MovementKind::AdjustLoss => write!(f, "adjust_loss"),
        }
    }
}

/// One immutable row of the movement ledger.
///
/// A movement is written by the same use case that mutated the lot, never
/// by the mutator itself, and is never edited or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    id: MovementId,
    lot_id: LotId,
    actor: UserId,
    kind: MovementKind,
    quantity: u32,
    recorded_at: DateTime<Utc>,
}

impl Movement {
    pub fn new(
        id: MovementId,
        lot_id: LotId,
        actor: UserId,
        kind: MovementKind,
        quantity: u32,
        recorded_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "movement quantity must be greater than zero",
            ));
        }
        Ok(Self {
            id,
            lot_id,
            actor,
            kind,
            quantity,
            recorded_at,
        })
    }

    pub fn id_typed(&self) -> MovementId {
        self.id
    }

    pub fn lot_id(&self) -> LotId {
        self.lot_id
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    pub fn kind(&self) -> MovementKind {
        self.kind
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// The signed quantity delta this movement applied to its lot.
    pub fn signed_delta(&self) -> i64 {
        self.kind.signed(self.quantity)
    }

    /// The lot quantity immediately before this movement was applied.
    ///
    /// Only correct when the lot's movements were applied in `recorded_at`
    /// order and none were removed; the ledger relies on that, it does not
    /// enforce it at the storage layer.
    pub fn quantity_before(&self, lot_current: u32) -> i64 {
        i64::from(lot_current) - self.signed_delta()
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(kind: MovementKind, quantity: u32) -> Movement {
        Movement::new(
            MovementId::new(),
            LotId::new(),
            UserId::new(),
            kind,
            quantity,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn sign_convention() {
        assert_eq!(movement(MovementKind::Entry, 7).signed_delta(), 7);
        assert_eq!(movement(MovementKind::AdjustGain, 7).signed_delta(), 7);
        assert_eq!(movement(MovementKind::Exit, 7).signed_delta(), -7);
        assert_eq!(movement(MovementKind::AdjustLoss, 7).signed_delta(), -7);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = Movement::new(
            MovementId::new(),
            LotId::new(),
            UserId::new(),
            MovementKind::Exit,
            0,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn quantity_before_inverts_the_delta() {
        // After an exit of 30 the lot holds 70, so before it held 100.
        assert_eq!(movement(MovementKind::Exit, 30).quantity_before(70), 100);
        // The creation entry of a lot of 50: before it, the lot held 0.
        assert_eq!(movement(MovementKind::Entry, 50).quantity_before(50), 0);
    }
}
