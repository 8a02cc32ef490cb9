//! Kit (bill-of-materials) assembly.
//!
//! Building a kit consumes component stock FIFO per recipe line, then
//! brings the assembled units into stock as a brand-new single-item lot
//! with its own entry movement.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use almoner_catalog::ProductCatalog;
use almoner_core::{DomainError, DomainResult, LotId, LotItemId, MovementId, ProductId, UserId};

use crate::fifo::{FifoConsumer, LotDraw};
use crate::lot::{Lot, LotItem, UnitOfMeasure};
use crate::movement::{Movement, MovementKind};
use crate::store::{LotStore, MovementStore};

/// Stock drawn for one recipe line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDraw {
    pub component: ProductId,
    pub required: u32,
    pub draws: Vec<LotDraw>,
}

/// Result of a successful kit build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitBuild {
    pub lot: Lot,
    pub item: LotItem,
    pub movement: Movement,
    pub components: Vec<ComponentDraw>,
}

/// Expands a kit's recipe and drives the consumption engine per component.
#[derive(Debug)]
pub struct KitAssembler<S: LotStore, M: MovementStore, C: ProductCatalog> {
    lots: S,
    movements: M,
    catalog: C,
}

impl<S, M, C> KitAssembler<S, M, C>
where
    S: LotStore,
    M: MovementStore,
    C: ProductCatalog,
{
    pub fn new(lots: S, movements: M, catalog: C) -> Self {
        Self {
            lots,
            movements,
            catalog,
        }
    }

    /// Build `quantity` units of the kit `product`.
    ///
    /// Fails with `NotAKit`/`EmptyRecipe` before touching any stock. A
    /// recipe line that cannot be covered aborts the remaining lines and
    /// propagates the engine's shortfall error; components consumed by
    /// earlier lines stay consumed; assembly is best-effort, not
    /// transactional.
    pub fn assemble(
        &self,
        product: ProductId,
        quantity: u32,
        actor: UserId,
        built_at: DateTime<Utc>,
    ) -> DomainResult<KitBuild> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "kit quantity must be greater than zero",
            ));
        }

        let kit = self.catalog.lookup(product)?;
        if !kit.is_kit() {
            warn!(%product, "kit build requested for a plain product");
            return Err(DomainError::not_a_kit(product));
        }
        if kit.bom().is_empty() {
            warn!(%product, "kit build requested with an empty recipe");
            return Err(DomainError::empty_recipe(product));
        }

        info!(%product, quantity, components = kit.bom().len(), "assembling kit");

        let consumer = FifoConsumer::new(&self.lots);
        let mut components = Vec::with_capacity(kit.bom().len());
        for line in kit.bom() {
            let required = line
                .quantity_per_unit()
                .checked_mul(quantity)
                .ok_or_else(|| {
                    DomainError::validation("kit quantity overflows the recipe line total")
                })?;
            let draws = consumer.consume(line.component(), required)?;
            components.push(ComponentDraw {
                component: line.component(),
                required,
                draws,
            });
        }

        let lot = Lot::new(
            LotId::new(),
            built_at.date_naive(),
            quantity,
            UnitOfMeasure::Unit,
            Some(format!("Kit assembly: {}", kit.name())),
        )?;
        let item = LotItem::new(LotItemId::new(), lot.id_typed(), product, quantity)?;
        self.lots.insert(lot.clone(), vec![item.clone()])?;

        let movement = Movement::new(
            MovementId::new(),
            lot.id_typed(),
            actor,
            MovementKind::Entry,
            quantity,
            built_at,
        )?;
        self.movements.append(movement.clone())?;

        info!(%product, quantity, lot = %lot.id_typed(), "kit assembled");

        Ok(KitBuild {
            lot,
            item,
            movement,
            components,
        })
    }
}
