//! # Domain Types
//!
//! Entities the planner reads and the two quantity fields it writes.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐       ┌──────────────┐ │
//! │  │    Product      │ 1    * │    BomLine      │ *   1 │ RawMaterial  │ │
//! │  │  ─────────────  │────────│  ─────────────  │───────│ ──────────── │ │
//! │  │  id (UUID)      │        │  product_id     │       │ id (UUID)    │ │
//! │  │  price_cents    │        │  raw_material_id│       │ unit         │ │
//! │  │  stock_quantity │        │  quantity_needed│       │ stock_qty    │ │
//! │  └─────────────────┘        └─────────────────┘       └──────────────┘ │
//! │                                                                         │
//! │  BomLine is owned by its Product (cascade delete) and merely           │
//! │  references its RawMaterial. At most one line per pair.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `Product.stock_quantity` and `RawMaterial.stock_quantity` are ever
//! written by production; everything else belongs to the CRUD collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_description, validate_name, validate_price_cents, validate_stock_quantity,
    validate_unit, ValidationResult,
};

// =============================================================================
// Product
// =============================================================================

/// A finished good assembled from raw materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Unit price in cents. Always positive.
    pub price_cents: i64,

    /// Finished units on hand. Starts at 0, credited by settlement.
    pub stock_quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Raw Material
// =============================================================================

/// A stocked input consumed by production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterial {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Unit cost in cents.
    pub price_cents: i64,
    /// Units on hand. Never negative.
    pub stock_quantity: i64,
    /// Unit-of-measure label ("un", "kg", "m²", ...).
    pub unit: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RawMaterial {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Bill of Materials
// =============================================================================

/// One raw-material requirement of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BomLine {
    pub id: String,
    pub product_id: String,
    pub raw_material_id: String,
    /// Raw material units consumed per produced unit.
    pub quantity_needed: i64,
}

/// A BOM line joined with the current state of its raw material.
///
/// This is the read projection used by both the allocation engine and
/// settlement, and the shape shown when listing a product's components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BomLineDetail {
    /// BOM line ID.
    pub id: String,
    pub product_id: String,
    pub raw_material_id: String,
    pub raw_material_name: String,
    pub raw_material_unit: String,
    pub quantity_needed: i64,
    /// Stock of the raw material at the time the row was read.
    pub raw_material_stock: i64,
}

/// A product together with its bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithMaterials {
    pub product: Product,
    pub raw_materials: Vec<BomLineDetail>,
}

impl ProductWithMaterials {
    /// A product without BOM lines can never be produced.
    #[inline]
    pub fn is_linked(&self) -> bool {
        !self.raw_materials.is_empty()
    }
}

// =============================================================================
// Collaborator Inputs
// =============================================================================
// Create payloads carry every required field; change payloads patch only
// the fields that are present.

/// Fields for a new raw material.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewRawMaterial {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i64,
    /// Defaults to [`crate::DEFAULT_UNIT`].
    pub unit: Option<String>,
}

impl NewRawMaterial {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        validate_price_cents(self.price_cents)?;
        validate_stock_quantity(self.stock_quantity)?;
        if let Some(unit) = &self.unit {
            validate_unit(unit)?;
        }
        Ok(())
    }
}

/// Partial update of a raw material.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub unit: Option<String>,
}

impl RawMaterialChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_deref())?;
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = self.stock_quantity {
            validate_stock_quantity(stock)?;
        }
        if let Some(unit) = &self.unit {
            validate_unit(unit)?;
        }
        Ok(())
    }

    /// Applies the present fields onto `target`.
    pub fn apply_to(&self, target: &mut RawMaterial) {
        if let Some(name) = &self.name {
            target.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            target.description = Some(description.clone());
        }
        if let Some(price) = self.price_cents {
            target.price_cents = price;
        }
        if let Some(stock) = self.stock_quantity {
            target.stock_quantity = stock;
        }
        if let Some(unit) = &self.unit {
            target.unit = unit.trim().to_string();
        }
    }
}

/// Fields for a new product. Stock starts at zero unless given.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        validate_price_cents(self.price_cents)?;
        validate_stock_quantity(self.stock_quantity)?;
        Ok(())
    }
}

/// Partial update of a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
}

impl ProductChanges {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_deref())?;
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = self.stock_quantity {
            validate_stock_quantity(stock)?;
        }
        Ok(())
    }

    /// Applies the present fields onto `target`.
    pub fn apply_to(&self, target: &mut Product) {
        if let Some(name) = &self.name {
            target.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            target.description = Some(description.clone());
        }
        if let Some(price) = self.price_cents {
            target.price_cents = price;
        }
        if let Some(stock) = self.stock_quantity {
            target.stock_quantity = stock;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price() {
        let now = Utc::now();
        let product = Product {
            id: "p".to_string(),
            name: "Desk".to_string(),
            description: None,
            price_cents: 45_000,
            stock_quantity: 0,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(product.price(), Money::from_cents(45_000));

        let unlinked = ProductWithMaterials {
            product,
            raw_materials: Vec::new(),
        };
        assert!(!unlinked.is_linked());
    }

    #[test]
    fn test_changes_patch_only_present_fields() {
        let now = Utc::now();
        let mut material = RawMaterial {
            id: "r".to_string(),
            name: "Plank".to_string(),
            description: None,
            price_cents: 500,
            stock_quantity: 40,
            unit: "un".to_string(),
            created_at: now,
            updated_at: now,
        };
        let changes = RawMaterialChanges {
            stock_quantity: Some(75),
            ..Default::default()
        };
        assert!(changes.validate().is_ok());
        changes.apply_to(&mut material);

        assert_eq!(material.stock_quantity, 75);
        assert_eq!(material.name, "Plank");
        assert_eq!(material.price_cents, 500);

        let bad = ProductChanges {
            price_cents: Some(0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_new_product_validation() {
        let product = NewProduct {
            name: "Bookshelf".to_string(),
            description: None,
            price_cents: 25_000,
            stock_quantity: 0,
        };
        assert!(product.validate().is_ok());

        let nameless = NewProduct {
            name: " ".to_string(),
            ..product
        };
        assert!(nameless.validate().is_err());
    }

    #[test]
    fn test_bom_line_detail_wire_shape() {
        let line = BomLineDetail {
            id: "l".to_string(),
            product_id: "p".to_string(),
            raw_material_id: "r".to_string(),
            raw_material_name: "Screw".to_string(),
            raw_material_unit: "un".to_string(),
            quantity_needed: 8,
            raw_material_stock: 300,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["rawMaterialId"], "r");
        assert_eq!(json["quantityNeeded"], 8);
        assert_eq!(json["rawMaterialStock"], 300);
    }
}
