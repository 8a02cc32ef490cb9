use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use almoner_core::{DomainError, DomainResult, Entity, LotId, LotItemId, ProductId};

/// Unit the lot's quantities are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    Unit,
    Kilogram,
    Liter,
    Box,
}

impl core::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnitOfMeasure::Unit => write!(f, "unit"),
            UnitOfMeasure::Kilogram => write!(f, "kg"),
            UnitOfMeasure::Liter => write!(f, "l"),
            UnitOfMeasure::Box => write!(f, "box"),
        }
    }
}

/// A received batch of goods tracked as one inventory unit.
///
/// Invariant: `0 <= current_quantity <= initial_quantity`, at all times.
/// Both bounds are enforced here, in [`Lot::apply_delta`]; callers never
/// write the quantity directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    id: LotId,
    entry_date: NaiveDate,
    initial_quantity: u32,
    current_quantity: u32,
    unit: UnitOfMeasure,
    observations: Option<String>,
}

impl Lot {
    /// Create a freshly received lot, filled to its initial quantity.
    pub fn new(
        id: LotId,
        entry_date: NaiveDate,
        initial_quantity: u32,
        unit: UnitOfMeasure,
        observations: Option<String>,
    ) -> DomainResult<Self> {
        if initial_quantity == 0 {
            return Err(DomainError::validation(
                "lot quantity must be greater than zero",
            ));
        }
        Ok(Self {
            id,
            entry_date,
            initial_quantity,
            current_quantity: initial_quantity,
            unit,
            observations,
        })
    }

    pub fn id_typed(&self) -> LotId {
        self.id
    }

    pub fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    pub fn initial_quantity(&self) -> u32 {
        self.initial_quantity
    }

    pub fn current_quantity(&self) -> u32 {
        self.current_quantity
    }

    pub fn unit(&self) -> UnitOfMeasure {
        self.unit
    }

    pub fn observations(&self) -> Option<&str> {
        self.observations.as_deref()
    }

    pub fn has_stock(&self) -> bool {
        self.current_quantity > 0
    }

    /// Apply a signed delta to the current quantity.
    ///
    /// Rejects (never clamps) any result outside `0..=initial_quantity`.
    /// Must only be called while holding the lot's exclusive lock.
    pub fn apply_delta(&mut self, delta: i64) -> DomainResult<()> {
        let next = i64::from(self.current_quantity) + delta;
        if next < 0 {
            return Err(DomainError::InsufficientLotStock {
                lot: self.id,
                available: self.current_quantity,
            });
        }
        if next > i64::from(self.initial_quantity) {
            return Err(DomainError::exceeds_initial(self.id, self.initial_quantity));
        }
        self.current_quantity = next as u32;
        Ok(())
    }
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A specific product within a lot, with the portion of the lot's quantity
/// attributed to it and its optional physical attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotItem {
    id: LotItemId,
    lot_id: LotId,
    product_id: ProductId,
    quantity: u32,
    expiry_date: Option<NaiveDate>,
    size: Option<String>,
    voltage: Option<String>,
}

impl LotItem {
    pub fn new(
        id: LotItemId,
        lot_id: LotId,
        product_id: ProductId,
        quantity: u32,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "lot item quantity must be greater than zero",
            ));
        }
        Ok(Self {
            id,
            lot_id,
            product_id,
            quantity,
            expiry_date: None,
            size: None,
            voltage: None,
        })
    }

    pub fn with_expiry_date(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_voltage(mut self, voltage: impl Into<String>) -> Self {
        self.voltage = Some(voltage.into());
        self
    }

    pub fn id_typed(&self) -> LotItemId {
        self.id
    }

    pub fn lot_id(&self) -> LotId {
        self.lot_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn voltage(&self) -> Option<&str> {
        self.voltage.as_deref()
    }

    /// Remove `quantity` units from this item line.
    ///
    /// Must only be called while holding the owning lot's exclusive lock,
    /// together with the matching [`Lot::apply_delta`].
    pub fn consume(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity > self.quantity {
            return Err(DomainError::validation(format!(
                "cannot consume {quantity} from an item holding {}",
                self.quantity
            )));
        }
        self.quantity -= quantity;
        Ok(())
    }
}

impl Entity for LotItem {
    type Id = LotItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
