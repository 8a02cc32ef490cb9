//! Product catalog domain module.
//!
//! Owns the product model (including kit recipes) and the lookup boundary
//! the stock engine consumes. Catalog CRUD itself lives outside this core.

use std::sync::Arc;

use almoner_core::{DomainResult, ProductId};

pub mod product;

pub use product::{BomLine, Product};

/// Catalog lookup boundary.
///
/// The stock engine only ever needs to resolve a product id into its kit
/// flag and recipe; everything else about catalog management is out of
/// scope here.
pub trait ProductCatalog {
    /// Resolve a product by id, or fail with a not-found error.
    fn lookup(&self, id: ProductId) -> DomainResult<Product>;
}

impl<C: ProductCatalog + ?Sized> ProductCatalog for &C {
    fn lookup(&self, id: ProductId) -> DomainResult<Product> {
        (**self).lookup(id)
    }
}

impl<C: ProductCatalog + ?Sized> ProductCatalog for Arc<C> {
    fn lookup(&self, id: ProductId) -> DomainResult<Product> {
        (**self).lookup(id)
    }
}
