use std::collections::HashMap;
use std::sync::RwLock;

use almoner_catalog::{Product, ProductCatalog};
use almoner_core::{DomainError, DomainResult, ProductId};

/// In-memory product catalog.
///
/// Catalog management is out of scope for the stock core; this only offers
/// what wiring and tests need: put products in, look products up.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a product.
    pub fn put(&self, product: Product) -> DomainResult<()> {
        let mut products = self
            .products
            .write()
            .map_err(|_| DomainError::storage("catalog lock poisoned"))?;
        products.insert(product.id_typed(), product);
        Ok(())
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn lookup(&self, id: ProductId) -> DomainResult<Product> {
        let products = self
            .products
            .read()
            .map_err(|_| DomainError::storage("catalog lock poisoned"))?;
        products
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("product", id))
    }
}
