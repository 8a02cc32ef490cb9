//! Stock domain module: the inventory-consistency engine.
//!
//! Lots of donated goods enter, are depleted FIFO (oldest entry date
//! first), get recombined into kit products, and every quantity change
//! lands in an append-only movement ledger. Storage is behind the traits
//! in [`store`]; this crate contains business rules and no IO.

pub mod fifo;
pub mod kit;
pub mod ledger;
pub mod lot;
pub mod movement;
pub mod mutator;
pub mod service;
pub mod store;

pub use fifo::{FifoConsumer, LotDraw};
pub use kit::{ComponentDraw, KitAssembler, KitBuild};
pub use ledger::{quantity_before_movement, reconcile, replay, Reconciliation};
pub use lot::{Lot, LotItem, UnitOfMeasure};
pub use movement::{Movement, MovementKind};
pub use mutator::{QuantityChange, QuantityMutator};
pub use service::{
    Donation, DonationLine, LotDetail, MovementDetail, NewLot, NewLotItem, ReceivedLot,
    RecordedMovement, StockService,
};
pub use store::{LotFilter, LotStore, MovementFilter, MovementStore};
