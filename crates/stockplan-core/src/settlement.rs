//! # Settlement Module
//!
//! Pure half of committing a production run: validate the request, compute
//! the feasible maximum from *real* stock, clamp, and describe the writes.
//! The database layer executes the resulting [`SettlementPlan`] inside one
//! transaction, using numbers it read inside that same transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  settle(product, requested)                                            │
//! │       │                                                                 │
//! │       ├── requested <= 0              → InvalidInput                    │
//! │       ├── no BOM lines                → NoRawMaterialsLinked            │
//! │       ├── line with needed <= 0       → InvalidComposition              │
//! │       ├── max <= 0                    → InsufficientRawMaterials        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  created = min(requested, max)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each line: stock -= needed × created   (floored at 0)              │
//! │  product.stock += created                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::feasibility::{feasible_quantity, Feasibility};
use crate::types::BomLineDetail;
use crate::validation::validate_production_quantity;

// =============================================================================
// Types
// =============================================================================

/// A single raw-material decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDeduction {
    pub raw_material_id: String,
    /// Stock observed when the plan was computed.
    pub stock_before: i64,
    /// Units to remove.
    pub amount: i64,
}

impl StockDeduction {
    /// Resulting stock, never below zero.
    #[inline]
    pub fn stock_after(&self) -> i64 {
        (self.stock_before - self.amount).max(0)
    }
}

/// The computed outcome of a settlement request, before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub product_id: String,
    pub quantity_requested: i64,
    pub quantity_created: i64,
    pub max_quantity_possible: i64,
    pub deductions: Vec<StockDeduction>,
}

impl SettlementPlan {
    /// True when the request was only partially fulfilled.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.quantity_created < self.quantity_requested
    }

    /// Builds the caller-facing result once the product credit is applied.
    pub fn into_result(self, new_product_stock_quantity: i64) -> SettlementResult {
        SettlementResult {
            product_id: self.product_id,
            quantity_requested: self.quantity_requested,
            quantity_created: self.quantity_created,
            max_quantity_possible: self.max_quantity_possible,
            new_product_stock_quantity,
        }
    }
}

/// What a successful settlement reports back.
///
/// Carrying both the requested and the created quantity lets callers detect
/// partial fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    pub product_id: String,
    pub quantity_requested: i64,
    pub quantity_created: i64,
    pub max_quantity_possible: i64,
    pub new_product_stock_quantity: i64,
}

// =============================================================================
// Planning a Settlement
// =============================================================================

/// Computes the settlement of `requested` units of a product.
///
/// `lines` must be the product's full bill of materials with stock read in
/// the same transaction that will apply the plan.
pub fn plan_settlement(
    product_id: &str,
    requested: i64,
    lines: &[BomLineDetail],
) -> CoreResult<SettlementPlan> {
    validate_production_quantity(requested)?;

    let max_quantity_possible = match feasible_quantity(lines, |line| line.raw_material_stock) {
        Feasibility::Unlinked => {
            return Err(CoreError::NoRawMaterialsLinked {
                product_id: product_id.to_string(),
            })
        }
        Feasibility::InvalidComposition { line_index } => {
            let line = &lines[line_index];
            return Err(CoreError::InvalidComposition {
                product_id: product_id.to_string(),
                raw_material_id: line.raw_material_id.clone(),
                quantity_needed: line.quantity_needed,
            });
        }
        Feasibility::Producible(max) => max,
    };

    if max_quantity_possible <= 0 {
        return Err(CoreError::InsufficientRawMaterials {
            product_id: product_id.to_string(),
        });
    }

    let quantity_created = requested.min(max_quantity_possible);
    if quantity_created <= 0 {
        return Err(CoreError::NothingToProduce {
            product_id: product_id.to_string(),
        });
    }

    let deductions = lines
        .iter()
        .map(|line| StockDeduction {
            raw_material_id: line.raw_material_id.clone(),
            stock_before: line.raw_material_stock,
            amount: line.quantity_needed * quantity_created,
        })
        .collect();

    Ok(SettlementPlan {
        product_id: product_id.to_string(),
        quantity_requested: requested,
        quantity_created,
        max_quantity_possible,
        deductions,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
