//! # Feasibility
//!
//! How many whole units of a product a bill of materials allows, given some
//! view of raw-material stock. Both the allocation engine (virtual stock) and
//! settlement (real stock) go through [`feasible_quantity`], so the two can
//! never disagree on the arithmetic.
//!
//! ```text
//! BOM of "Table"           stock         floor(stock / needed)
//! ─────────────────────    ──────────    ─────────────────────
//! plank  × 5               100           20
//! screw  × 8               300           37
//! varnish × 1              12            12   ← minimum
//!                                        ────
//!                          feasible  =   12
//! ```

use crate::types::BomLineDetail;

/// Outcome of a feasibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    /// No BOM lines at all.
    Unlinked,
    /// The first line found with `quantity_needed <= 0`.
    InvalidComposition { line_index: usize },
    /// Maximum producible units. May be zero.
    Producible(i64),
}

impl Feasibility {
    /// Producible quantity, or `None` when the product is not plannable.
    pub fn quantity(&self) -> Option<i64> {
        match self {
            Feasibility::Producible(qty) => Some(*qty),
            _ => None,
        }
    }
}

/// Computes the minimum of `floor(available / quantity_needed)` over all lines.
///
/// `available` is asked for the stock behind each line; callers decide
/// whether that is the real stock carried on the row or a scratch copy.
///
/// ## Example
/// ```rust
/// use stockplan_core::feasibility::{feasible_quantity, Feasibility};
///
/// assert_eq!(feasible_quantity(&[], |_| 0), Feasibility::Unlinked);
/// ```
pub fn feasible_quantity<F>(lines: &[BomLineDetail], mut available: F) -> Feasibility
where
    F: FnMut(&BomLineDetail) -> i64,
{
    if lines.is_empty() {
        return Feasibility::Unlinked;
    }

    let mut max_quantity = i64::MAX;
    for (line_index, line) in lines.iter().enumerate() {
        if line.quantity_needed <= 0 {
            return Feasibility::InvalidComposition { line_index };
        }
        let from_this_line = available(line).div_euclid(line.quantity_needed);
        max_quantity = max_quantity.min(from_this_line);
    }

    Feasibility::Producible(max_quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
