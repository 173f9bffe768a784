//! # Production Repository
//!
//! Suggestion runs and the transactional settlement of production.
//!
//! ## Settlement Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  settle(product_id, requested)                                         │
//! │       │                                                                 │
//! │       ├── requested <= 0 ──────────────────────────► InvalidInput      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  settle gate (one stock writer per process)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─── attempt (1..=settle_attempts) ─────────────────────────────────┐  │
//! │  │  BEGIN                                                           │  │
//! │  │  read product + BOM lines + raw-material stock                   │  │
//! │  │  plan_settlement() → clamp, deductions                           │  │
//! │  │  UPDATE raw_materials ... WHERE stock_quantity = <read value>    │  │
//! │  │     └── 0 rows or SQLITE_BUSY → ROLLBACK, next attempt           │  │
//! │  │  UPDATE products SET stock_quantity = stock_quantity + created   │  │
//! │  │  COMMIT                                                          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       └── attempts exhausted ────────────────────► ConcurrencyConflict │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate only orders writers inside this process. The guarded UPDATE is
//! what catches writers outside it (another process on the same file, or a
//! CRUD stock correction that landed between read and write).

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::product::{fetch_catalog, fetch_materials, fetch_product};
use stockplan_core::planning::{compute_suggestions, plan_confirmation, ProductCredit};
use stockplan_core::settlement::plan_settlement;
use stockplan_core::validation::{validate_production_quantity, validate_reference};
use stockplan_core::{CoreError, SettlementResult, StockDeduction, SuggestionList};

/// Outcome of one transactional attempt.
enum Attempt<T> {
    Committed(T),
    /// A guarded write found the row changed since it was read.
    Interleaved { row: String },
}

/// Repository for production planning and settlement.
///
/// ## Usage
/// ```rust,ignore
/// let production = db.production();
///
/// let plan = production.suggestions().await?;
/// let result = production.settle(&table_id, 10).await?;
/// if result.quantity_created < result.quantity_requested {
///     // partially fulfilled
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProductionRepository {
    pool: SqlitePool,
    gate: Arc<Mutex<()>>,
    attempts: u32,
}

impl ProductionRepository {
    /// Creates a new ProductionRepository sharing `gate` with every other
    /// handle on the same database.
    pub fn new(pool: SqlitePool, gate: Arc<Mutex<()>>, attempts: u32) -> Self {
        ProductionRepository {
            pool,
            gate,
            attempts: attempts.max(1),
        }
    }

    /// Computes the production suggestions from current stock.
    ///
    /// Read-only and ungated. The list is advisory: nothing is reserved, and
    /// a later settlement recomputes against whatever stock it finds.
    pub async fn suggestions(&self) -> DbResult<SuggestionList> {
        let mut conn = self.pool.acquire().await?;
        let catalog = fetch_catalog(&mut conn).await?;

        let suggestions = compute_suggestions(&catalog);

        debug!(
            products = suggestions.products.len(),
            grand_total = %suggestions.grand_total_value,
            "Computed production suggestions"
        );
        Ok(suggestions)
    }

    /// Produces up to `quantity` units of a product.
    ///
    /// The request is clamped to what current stock allows. Raw materials
    /// are deducted and the product credited in one transaction, so either
    /// every row changes or none does.
    ///
    /// ## Errors
    /// * `InvalidInput` - Empty product id or `quantity <= 0`
    /// * `NotFound` - Unknown product
    /// * `InvalidState` - No BOM lines, an invalid line, or zero producible
    /// * `ConcurrencyConflict` - Stock kept changing underneath every attempt
    pub async fn settle(&self, product_id: &str, quantity: i64) -> DbResult<SettlementResult> {
        validate_reference("product_id", product_id)?;
        validate_production_quantity(quantity)?;

        let _gate = self.gate.lock().await;

        let result = self
            .with_attempts("settle", move || self.try_settle(product_id, quantity))
            .await?;

        info!(
            product_id = %result.product_id,
            requested = result.quantity_requested,
            created = result.quantity_created,
            max_possible = result.max_quantity_possible,
            new_stock = result.new_product_stock_quantity,
            "Production settled"
        );
        Ok(result)
    }

    /// Recomputes the suggestions and commits all of them at once.
    ///
    /// Every suggested product is credited with its `quantity_possible` and
    /// every raw material is debited by the summed requirement. Returns the
    /// suggestions that were committed; an empty list commits nothing.
    pub async fn confirm_suggestions(&self) -> DbResult<SuggestionList> {
        let _gate = self.gate.lock().await;

        let committed = self
            .with_attempts("confirm", move || self.try_confirm())
            .await?;

        info!(
            products = committed.products.len(),
            grand_total = %committed.grand_total_value,
            "Production plan confirmed"
        );
        Ok(committed)
    }

    /// Runs `attempt` until it commits, fails for good, or the budget runs out.
    async fn with_attempts<T, F, Fut>(&self, operation: &str, mut attempt: F) -> DbResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DbResult<Attempt<T>>>,
    {
        for n in 1..=self.attempts {
            match attempt().await {
                Ok(Attempt::Committed(value)) => return Ok(value),
                Ok(Attempt::Interleaved { row }) => {
                    warn!(operation, attempt = n, row = %row, "Stock changed during attempt, retrying");
                }
                Err(err) if err.is_retryable() => {
                    warn!(operation, attempt = n, error = %err, "Database busy, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(operation, attempts = self.attempts, "Giving up after repeated conflicts");
        Err(DbError::ConcurrencyConflict {
            attempts: self.attempts,
        })
    }

    async fn try_settle(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<Attempt<SettlementResult>> {
        let mut tx = self.pool.begin().await?;

        let product = fetch_product(&mut *tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        let lines = fetch_materials(&mut *tx, &product.id).await?;

        let plan = plan_settlement(&product.id, quantity, &lines)?;

        debug!(
            product_id = %plan.product_id,
            requested = plan.quantity_requested,
            created = plan.quantity_created,
            partial = plan.is_partial(),
            "Settlement planned"
        );

        for deduction in &plan.deductions {
            if !apply_deduction(&mut *tx, deduction).await? {
                tx.rollback().await?;
                return Ok(Attempt::Interleaved {
                    row: deduction.raw_material_id.clone(),
                });
            }
        }

        let credit = ProductCredit {
            product_id: product.id.clone(),
            quantity: plan.quantity_created,
        };
        if !apply_credit(&mut *tx, &credit).await? {
            tx.rollback().await?;
            return Ok(Attempt::Interleaved { row: credit.product_id });
        }

        let new_stock: i64 = sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
            .bind(&product.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Attempt::Committed(plan.into_result(new_stock)))
    }

    async fn try_confirm(&self) -> DbResult<Attempt<SuggestionList>> {
        let mut tx = self.pool.begin().await?;

        let catalog = fetch_catalog(&mut *tx).await?;
        let plan = plan_confirmation(&catalog);

        if plan.suggestions.is_empty() {
            tx.rollback().await?;
            return Ok(Attempt::Committed(plan.suggestions));
        }

        for deduction in &plan.deductions {
            if !apply_deduction(&mut *tx, deduction).await? {
                tx.rollback().await?;
                return Ok(Attempt::Interleaved {
                    row: deduction.raw_material_id.clone(),
                });
            }
        }

        for credit in &plan.credits {
            if !apply_credit(&mut *tx, credit).await? {
                tx.rollback().await?;
                return Ok(Attempt::Interleaved {
                    row: credit.product_id.clone(),
                });
            }
        }

        tx.commit().await?;

        Ok(Attempt::Committed(plan.suggestions))
    }
}

// =============================================================================
// Guarded Writes
// =============================================================================

/// Debits a raw material, clamped at zero, only if its stock is still the
/// value the plan was computed from. Returns false on a guard miss.
async fn apply_deduction(conn: &mut SqliteConnection, deduction: &StockDeduction) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE raw_materials
        SET stock_quantity = MAX(0, stock_quantity - ?1),
            updated_at = ?2
        WHERE id = ?3 AND stock_quantity = ?4
        "#,
    )
    .bind(deduction.amount)
    .bind(Utc::now())
    .bind(&deduction.raw_material_id)
    .bind(deduction.stock_before)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Credits finished units to a product. Returns false if the row is gone.
async fn apply_credit(conn: &mut SqliteConnection, credit: &ProductCredit) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity + ?1,
            updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(credit.quantity)
    .bind(Utc::now())
    .bind(&credit.product_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
