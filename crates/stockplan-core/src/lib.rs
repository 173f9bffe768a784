//! # stockplan-core: Pure Production Planning Logic
//!
//! This crate holds the rules that decide how many units of each product can
//! be assembled from the raw materials on hand, and what a production run
//! does to stock. Everything here is a pure function over data snapshots.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      StockPlan Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host (HTTP / CLI / desktop)                     │   │
//! │  │        get_suggestions, settle(product, qty), confirm           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ stockplan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────────┐ ┌──────────────┐  │   │
//! │  │   │  types   │ │  money   │ │   planning   │ │  settlement  │  │   │
//! │  │   │ Product  │ │  Money   │ │ suggestions  │ │ clamp + plan │  │   │
//! │  │   │ BomLine  │ │          │ │ virtual stock│ │  deductions  │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────────┘ └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockplan-db (Database Layer)                  │   │
//! │  │        SQLite repositories, settlement transactions             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, RawMaterial, BomLine)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types and the error taxonomy
//! - [`validation`] - Data-entry rules
//! - [`feasibility`] - How many units a bill of materials allows
//! - [`planning`] - Price-priority allocation over a shared stock pool
//! - [`settlement`] - Clamping a requested run and computing its deductions
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use stockplan_core::planning::compute_suggestions;
//! use stockplan_core::{BomLineDetail, Product, ProductWithMaterials};
//!
//! let now = Utc::now();
//! let table = ProductWithMaterials {
//!     product: Product {
//!         id: "p-1".to_string(),
//!         name: "Table".to_string(),
//!         description: None,
//!         price_cents: 10_000,
//!         stock_quantity: 0,
//!         created_at: now,
//!         updated_at: now,
//!     },
//!     raw_materials: vec![BomLineDetail {
//!         id: "l-1".to_string(),
//!         product_id: "p-1".to_string(),
//!         raw_material_id: "rm-1".to_string(),
//!         raw_material_name: "Plank".to_string(),
//!         raw_material_unit: "un".to_string(),
//!         quantity_needed: 5,
//!         raw_material_stock: 100,
//!     }],
//! };
//!
//! let list = compute_suggestions(&[table]);
//! assert_eq!(list.products[0].quantity_possible, 20);
//! assert_eq!(list.grand_total_value.cents(), 200_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod feasibility;
pub mod money;
pub mod planning;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use planning::{ProductionSuggestion, SuggestionList};
pub use settlement::{SettlementPlan, SettlementResult, StockDeduction};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Unit of measure assigned to raw materials created without one.
pub const DEFAULT_UNIT: &str = "un";

/// Shortest accepted product / raw material name.
pub const MIN_NAME_LEN: usize = 2;

/// Longest accepted product / raw material name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Longest accepted unit-of-measure label.
pub const MAX_UNIT_LEN: usize = 20;

/// Highest accepted unit price, in cents.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Highest stock level a CRUD collaborator may set.
///
/// `MAX_PRICE_CENTS * MAX_STOCK_QUANTITY` fits in an `i64`, so the value
/// of any single suggestion is exact.
pub const MAX_STOCK_QUANTITY: i64 = 100_000_000;
