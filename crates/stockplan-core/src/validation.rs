//! # Validation Module
//!
//! Data-entry rules for products, raw materials and BOM lines.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Host (request parsing)                                       │
//! │  └── Types, required fields                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, positive prices, quantity_needed >= 1                    │
//! │  └── Production quantity > 0                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  └── UNIQUE (product_id, raw_material_id)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockplan_core::validation::{validate_quantity_needed, validate_production_quantity};
//!
//! assert!(validate_quantity_needed(4).is_ok());
//! assert!(validate_production_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_PRICE_CENTS, MAX_STOCK_QUANTITY, MAX_UNIT_LEN,
    MIN_NAME_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or raw material name.
///
/// ## Rules
/// - Must not be blank
/// - Between 2 and 200 characters after trimming
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: MIN_NAME_LEN,
        });
    }

    if len > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional description.
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a unit-of-measure label.
///
/// ## Example
/// ```rust
/// use stockplan_core::validation::validate_unit;
///
/// assert!(validate_unit("kg").is_ok());
/// assert!(validate_unit("").is_err());
/// ```
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.chars().count() > MAX_UNIT_LEN {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: MAX_UNIT_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price in cents. Zero is rejected, and so is anything
/// above [`MAX_PRICE_CENTS`].
///
/// ## Example
/// ```rust
/// use stockplan_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// assert!(validate_price_cents(1_000_000_000_000).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level set by a CRUD collaborator.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "stock_quantity".to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the per-unit requirement of a BOM line.
///
/// ## Rules
/// - At least 1. A zero or negative requirement would make the engine
///   divide by zero or mint raw material out of nothing.
pub fn validate_quantity_needed(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::OutOfRange {
            field: "quantity_needed".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a requested production quantity.
///
/// ## User Workflow
/// ```text
/// settle(product, requested)
///      │
///      ▼
/// validate_production_quantity(requested) ← THIS FUNCTION
///      │
///      ├── requested <= 0 → InvalidInput, nothing loaded
///      │
///      └── OK → load BOM, compute max, clamp
/// ```
pub fn validate_production_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Reference Validators
// =============================================================================

/// Validates that an entity reference is present.
///
/// Only emptiness is checked here; an id that names nothing is a
/// `NotFound` reported by the lookup, not an input error.
///
/// ## Example
/// ```rust
/// use stockplan_core::validation::validate_reference;
///
/// assert!(validate_reference("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_reference("product_id", "  ").is_err());
/// ```
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
