use serde::{Deserialize, Serialize};

use almoner_core::{DomainError, DomainResult, Entity, ProductId};

/// One line of a kit's bill of materials: a component product and how many
/// units of it go into a single assembled kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    component: ProductId,
    quantity_per_unit: u32,
}

impl BomLine {
    pub fn new(component: ProductId, quantity_per_unit: u32) -> DomainResult<Self> {
        if quantity_per_unit == 0 {
            return Err(DomainError::validation(
                "recipe line quantity must be greater than zero",
            ));
        }
        Ok(Self {
            component,
            quantity_per_unit,
        })
    }

    pub fn component(&self) -> ProductId {
        self.component
    }

    pub fn quantity_per_unit(&self) -> u32 {
        self.quantity_per_unit
    }
}

/// A catalogued product.
///
/// Plain products are donated and distributed as-is. Kit products carry a
/// bill of materials and come into stock only through assembly, which
/// consumes component stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    manufacturer_barcode: Option<String>,
    is_kit: bool,
    bom: Vec<BomLine>,
}

impl Product {
    /// Create a plain (non-kit) product.
    pub fn new(id: ProductId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            description: None,
            manufacturer_barcode: None,
            is_kit: false,
            bom: Vec::new(),
        })
    }

    /// Create a kit product with its recipe.
    ///
    /// An empty recipe is representable (the catalog may hold a kit whose
    /// recipe is still being drafted); assembling such a kit fails.
    pub fn kit(
        id: ProductId,
        name: impl Into<String>,
        bom: Vec<BomLine>,
    ) -> DomainResult<Self> {
        let mut product = Self::new(id, name)?;
        product.is_kit = true;
        product.bom = bom;
        Ok(product)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_manufacturer_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.manufacturer_barcode = Some(barcode.into());
        self
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn manufacturer_barcode(&self) -> Option<&str> {
        self.manufacturer_barcode.as_deref()
    }

    pub fn is_kit(&self) -> bool {
        self.is_kit
    }

    /// The recipe, in declaration order. Empty for plain products.
    pub fn bom(&self) -> &[BomLine] {
        &self.bom
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
