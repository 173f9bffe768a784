//! # Error Types
//!
//! Domain-specific error types for stockplan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockplan-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockplan-db errors (separate crate)                                  │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Every error answers kind() → ErrorKind so a host can map it to a      │
//! │  status code without matching on individual variants.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All of these are no-op failures: a settlement that returns one of them
//! has not changed any stock.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced product or raw material does not exist.
    NotFound,
    /// The caller sent a missing or out-of-range value.
    InvalidInput,
    /// The request is well formed but the current data forbids it.
    InvalidState,
    /// A concurrent writer kept winning; nothing was changed.
    ConcurrencyConflict,
    /// Store unavailable, broken schema, and other opaque faults.
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Raw material cannot be found.
    #[error("Raw material not found: {0}")]
    RawMaterialNotFound(String),

    /// The product has no bill of materials, so it can never be produced.
    #[error("Product {product_id} has no raw materials linked")]
    NoRawMaterialsLinked { product_id: String },

    /// A bill-of-materials line requires a non-positive quantity.
    ///
    /// ## When This Occurs
    /// Only with data that bypassed validation (hand-edited database,
    /// legacy import). Entry-time validation rejects `quantity_needed < 1`.
    #[error("Invalid product composition for {product_id}: raw material {raw_material_id} needs {quantity_needed}")]
    InvalidComposition {
        product_id: String,
        raw_material_id: String,
        quantity_needed: i64,
    },

    /// Current stock cannot cover even a single unit.
    ///
    /// ## User Workflow
    /// ```text
    /// settle(table, 3)
    ///      │
    ///      ▼
    /// plank stock 4, needs 5 per table → max 0
    ///      │
    ///      ▼
    /// InsufficientRawMaterials { product_id: "table" }
    /// ```
    #[error("Insufficient raw materials to produce {product_id}")]
    InsufficientRawMaterials { product_id: String },

    /// The clamped quantity came out non-positive.
    #[error("Nothing to produce for {product_id}")]
    NothingToProduce { product_id: String },

    /// The raw material is already part of the product's bill of materials.
    #[error("Raw material {raw_material_id} is already linked to product {product_id}")]
    DuplicateComponent {
        product_id: String,
        raw_material_id: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_) | CoreError::RawMaterialNotFound(_) => ErrorKind::NotFound,
            CoreError::Validation(_) => ErrorKind::InvalidInput,
            CoreError::NoRawMaterialsLinked { .. }
            | CoreError::InvalidComposition { .. }
            | CoreError::InsufficientRawMaterials { .. }
            | CoreError::NothingToProduce { .. }
            | CoreError::DuplicateComponent { .. } => ErrorKind::InvalidState,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
