//! Domain error model.

use thiserror::Error;

use crate::id::{LotId, ProductId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, stock shortfalls). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive quantity, blank name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found (domain-level).
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// A mutation would drive a lot's current quantity below zero.
    #[error("insufficient stock in lot {lot}: available {available}")]
    InsufficientLotStock { lot: LotId, available: u32 },

    /// FIFO consumption exhausted every eligible lot with demand left over.
    #[error("insufficient stock for product {product}: short {shortfall}")]
    InsufficientProductStock { product: ProductId, shortfall: u32 },

    /// A business rule was violated (not a kit, empty recipe, moved lot, ...).
    #[error("business rule violated: {0}")]
    BusinessRule(String),

    /// A conflict occurred (e.g. inserting an id that already exists).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage layer failed (e.g. a poisoned lock).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// The target product of a kit build is not flagged as a kit.
    pub fn not_a_kit(product: ProductId) -> Self {
        Self::business_rule(format!("product {product} is not a kit"))
    }

    /// A kit build was requested for a product with an empty recipe.
    pub fn empty_recipe(product: ProductId) -> Self {
        Self::business_rule(format!("kit {product} has no components in its recipe"))
    }

    /// The lot has recorded movements; its history must not be rewritten.
    pub fn lot_already_moved(lot: LotId) -> Self {
        Self::business_rule(format!("lot {lot} already has movements"))
    }

    /// A gain would push a lot's current quantity past its initial fill.
    pub fn exceeds_initial(lot: LotId, initial: u32) -> Self {
        Self::business_rule(format!(
            "gain would exceed initial quantity {initial} of lot {lot}"
        ))
    }
}
