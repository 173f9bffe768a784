//! # Planning Module
//!
//! The allocation engine: from one snapshot of products, BOM lines and raw
//! material stock, decide how many units of each product to suggest.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Order products by unit price DESC, then by id ASC                  │
//! │                                                                         │
//! │  2. For each product in that order:                                    │
//! │       ├── no BOM lines / bad line  → skip                              │
//! │       ├── q = min floor(virtual[rm] / needed)                          │
//! │       ├── q <= 0                   → skip, consume nothing             │
//! │       └── virtual[rm] -= needed × q, emit suggestion                   │
//! │                                                                         │
//! │  virtual[rm] is filled the first time rm is seen and thrown away at    │
//! │  the end. Persisted stock is never touched.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is greedy by price. A cheaper product can receive nothing even when
//! a different split would raise the grand total; the order is fixed so the
//! same snapshot always produces the same list.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::feasibility::feasible_quantity;
use crate::money::Money;
use crate::settlement::StockDeduction;
use crate::types::{BomLineDetail, Product, ProductWithMaterials};

// =============================================================================
// Output Types
// =============================================================================

/// One line of the production plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSuggestion {
    pub product_id: String,
    pub product_name: String,
    pub quantity_possible: i64,
    pub unit_price: Money,
    /// `unit_price × quantity_possible`.
    pub total_value: Money,
}

/// The ordered suggestion list and its grand total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionList {
    pub products: Vec<ProductionSuggestion>,
    pub grand_total_value: Money,
}

impl SuggestionList {
    /// True when nothing at all can be produced.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Finds the suggestion for a product, if it got one.
    pub fn get(&self, product_id: &str) -> Option<&ProductionSuggestion> {
        self.products.iter().find(|s| s.product_id == product_id)
    }
}

/// Finished-goods credit produced by confirming a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCredit {
    pub product_id: String,
    pub quantity: i64,
}

/// Everything needed to commit a suggestion list in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionPlan {
    pub suggestions: SuggestionList,
    /// One entry per raw material, summed over every suggestion.
    pub deductions: Vec<StockDeduction>,
    pub credits: Vec<ProductCredit>,
}

// =============================================================================
// Priority Order
// =============================================================================

/// Price descending, ties broken by id ascending.
pub fn priority_order(a: &Product, b: &Product) -> Ordering {
    b.price_cents
        .cmp(&a.price_cents)
        .then_with(|| a.id.cmp(&b.id))
}

// =============================================================================
// Virtual Stock
// =============================================================================

/// Scratch copy of raw-material stock for a single suggestion run.
#[derive(Debug, Default)]
struct VirtualStock {
    levels: HashMap<String, i64>,
}

impl VirtualStock {
    /// Current level, initialized from the row on first sight.
    fn available(&mut self, line: &BomLineDetail) -> i64 {
        *self
            .levels
            .entry(line.raw_material_id.clone())
            .or_insert(line.raw_material_stock)
    }

    /// Exact deduction; feasibility was derived from the same numbers.
    fn consume(&mut self, line: &BomLineDetail, produced: i64) {
        let level = self
            .levels
            .entry(line.raw_material_id.clone())
            .or_insert(line.raw_material_stock);
        *level -= line.quantity_needed * produced;
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Runs the allocation over a catalog snapshot.
///
/// The input order does not matter; products are re-ordered internally.
pub fn compute_suggestions(catalog: &[ProductWithMaterials]) -> SuggestionList {
    let mut ordered: Vec<&ProductWithMaterials> = catalog.iter().collect();
    ordered.sort_by(|a, b| priority_order(&a.product, &b.product));

    let mut stock = VirtualStock::default();
    let mut list = SuggestionList::default();

    for entry in ordered {
        let feasible = feasible_quantity(&entry.raw_materials, |line| stock.available(line));

        let quantity = match feasible.quantity() {
            Some(q) if q > 0 => q,
            _ => continue,
        };

        for line in &entry.raw_materials {
            stock.consume(line, quantity);
        }

        let unit_price = entry.product.price();
        let total_value = unit_price.multiply_quantity(quantity);
        list.grand_total_value += total_value;
        list.products.push(ProductionSuggestion {
            product_id: entry.product.id.clone(),
            product_name: entry.product.name.clone(),
            quantity_possible: quantity,
            unit_price,
            total_value,
        });
    }

    list
}

/// Computes the suggestions and the stock mutations that commit all of them.
///
/// Deductions are aggregated per raw material and clamped at zero, matching
/// single-product settlement.
pub fn plan_confirmation(catalog: &[ProductWithMaterials]) -> ProductionPlan {
    let suggestions = compute_suggestions(catalog);

    let by_product: HashMap<&str, &ProductWithMaterials> = catalog
        .iter()
        .map(|entry| (entry.product.id.as_str(), entry))
        .collect();

    // BTreeMap keeps the write order stable across runs.
    let mut totals: BTreeMap<String, StockDeduction> = BTreeMap::new();
    let mut credits = Vec::with_capacity(suggestions.products.len());

    for suggestion in &suggestions.products {
        let Some(entry) = by_product.get(suggestion.product_id.as_str()) else {
            continue;
        };

        for line in &entry.raw_materials {
            let deduction = totals
                .entry(line.raw_material_id.clone())
                .or_insert_with(|| StockDeduction {
                    raw_material_id: line.raw_material_id.clone(),
                    stock_before: line.raw_material_stock,
                    amount: 0,
                });
            deduction.amount += line.quantity_needed * suggestion.quantity_possible;
        }

        credits.push(ProductCredit {
            product_id: suggestion.product_id.clone(),
            quantity: suggestion.quantity_possible,
        });
    }

    ProductionPlan {
        suggestions,
        deductions: totals.into_values().collect(),
        credits,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, lines: &[(&str, i64, i64)]) -> ProductWithMaterials {
        let now = Utc::now();
        ProductWithMaterials {
            product: Product {
                id: id.to_string(),
                name: format!("Product {id}"),
                description: None,
                price_cents,
                stock_quantity: 0,
                created_at: now,
                updated_at: now,
            },
            raw_materials: lines
                .iter()
                .map(|(rm, needed, stock)| BomLineDetail {
                    id: format!("{id}-{rm}"),
                    product_id: id.to_string(),
                    raw_material_id: rm.to_string(),
                    raw_material_name: rm.to_string(),
                    raw_material_unit: "un".to_string(),
                    quantity_needed: *needed,
                    raw_material_stock: *stock,
                })
                .collect(),
        }
    }

    #[test]
    fn test_single_product() {
        let catalog = [product("p", 10_000, &[("r", 5, 100)])];
        let list = compute_suggestions(&catalog);

        assert_eq!(list.products.len(), 1);
        assert_eq!(list.products[0].quantity_possible, 20);
        assert_eq!(list.products[0].total_value, Money::from_cents(200_000));
        assert_eq!(list.grand_total_value, Money::from_cents(200_000));
    }

    #[test]
    fn test_extreme_catalog_saturates_instead_of_overflowing() {
        // rows written outside validation, e.g. by a legacy import
        let catalog = [
            product("gold", 1_000_000_000_000, &[("bar", 1, 100_000_000)]),
            product("silver", 900_000_000_000, &[("ingot", 1, 100_000_000)]),
        ];
        let list = compute_suggestions(&catalog);

        assert_eq!(list.products.len(), 2);
        assert_eq!(list.products[0].quantity_possible, 100_000_000);
        assert_eq!(list.products[0].total_value, Money::MAX);
        assert_eq!(list.grand_total_value, Money::MAX);
    }

    #[test]
    fn test_largest_valid_values_are_exact() {
        let catalog = [product(
            "p",
            crate::MAX_PRICE_CENTS,
            &[("r", 1, crate::MAX_STOCK_QUANTITY)],
        )];
        let list = compute_suggestions(&catalog);

        let expected = Money::from_cents(crate::MAX_PRICE_CENTS * crate::MAX_STOCK_QUANTITY);
        assert_eq!(list.products[0].total_value, expected);
        assert_eq!(list.grand_total_value, expected);
    }

    #[test]
    fn test_unlinked_product_is_excluded() {
        let catalog = [product("empty", 99_999, &[]), product("p", 100, &[("r", 1, 3)])];
        let list = compute_suggestions(&catalog);

        assert_eq!(list.products.len(), 1);
        assert!(list.get("empty").is_none());
    }

    #[test]
    fn test_higher_price_consumes_shared_material_first() {
        let catalog = [
            product("cheap", 1_000, &[("wood", 2, 10)]),
            product("premium", 5_000, &[("wood", 3, 10)]),
        ];
        let list = compute_suggestions(&catalog);

        // premium takes 9 of 10 planks, cheap cannot get the 2 it needs
        assert_eq!(list.products.len(), 1);
        assert_eq!(list.products[0].product_id, "premium");
        assert_eq!(list.products[0].quantity_possible, 3);
        assert_eq!(list.grand_total_value, Money::from_cents(15_000));
    }

    #[test]
    fn test_shared_material_partially_left_for_second() {
        let catalog = [
            product("a", 5_000, &[("wood", 4, 10), ("nail", 1, 1)]),
            product("b", 1_000, &[("wood", 2, 10)]),
        ];
        let list = compute_suggestions(&catalog);

        assert_eq!(list.get("a").map(|s| s.quantity_possible), Some(1));
        assert_eq!(list.get("b").map(|s| s.quantity_possible), Some(3));
        assert_eq!(list.grand_total_value, Money::from_cents(5_000 + 3_000));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let catalog = [
            product("b", 1_000, &[("wood", 5, 5)]),
            product("a", 1_000, &[("wood", 5, 5)]),
        ];
        let list = compute_suggestions(&catalog);

        assert_eq!(list.products.len(), 1);
        assert_eq!(list.products[0].product_id, "a");
    }

    #[test]
    fn test_invalid_line_skips_product_without_consuming() {
        let catalog = [
            product("broken", 9_000, &[("wood", 1, 10), ("glue", 0, 10)]),
            product("ok", 1_000, &[("wood", 1, 10)]),
        ];
        let list = compute_suggestions(&catalog);

        assert!(list.get("broken").is_none());
        assert_eq!(list.get("ok").map(|s| s.quantity_possible), Some(10));
    }

    #[test]
    fn test_idempotent_over_same_snapshot() {
        let catalog = [
            product("a", 3_000, &[("wood", 2, 11), ("steel", 1, 4)]),
            product("b", 2_000, &[("steel", 1, 4)]),
            product("c", 2_000, &[("wood", 1, 11)]),
        ];
        assert_eq!(compute_suggestions(&catalog), compute_suggestions(&catalog));
    }

    #[test]
    fn test_suggestions_never_overdraw_stock() {
        let catalog = [
            product("a", 3_000, &[("wood", 2, 11), ("steel", 1, 4)]),
            product("b", 2_500, &[("steel", 3, 4), ("wood", 1, 11)]),
            product("c", 2_000, &[("wood", 1, 11)]),
        ];
        let plan = plan_confirmation(&catalog);

        for deduction in &plan.deductions {
            assert!(deduction.amount <= deduction.stock_before);
            assert!(deduction.stock_after() >= 0);
        }
    }

    #[test]
    fn test_plan_confirmation_aggregates_per_material() {
        let catalog = [
            product("a", 5_000, &[("wood", 4, 10), ("nail", 1, 1)]),
            product("b", 1_000, &[("wood", 2, 10)]),
        ];
        let plan = plan_confirmation(&catalog);

        let wood = plan
            .deductions
            .iter()
            .find(|d| d.raw_material_id == "wood")
            .unwrap();
        assert_eq!(wood.amount, 4 + 6);
        assert_eq!(wood.stock_after(), 0);

        assert_eq!(plan.credits.len(), 2);
        assert_eq!(
            plan.credits[0],
            ProductCredit {
                product_id: "a".to_string(),
                quantity: 1
            }
        );
    }

    #[test]
    fn test_empty_catalog() {
        let list = compute_suggestions(&[]);
        assert!(list.is_empty());
        assert!(list.grand_total_value.is_zero());
    }
}
