//! # stockplan-db: Persistence and Settlement for StockPlan
//!
//! SQLite storage for products, raw materials and their bills of
//! materials, plus the transactional settlement of production runs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockPlan Data Flow                              │
//! │                                                                         │
//! │  Host (service, CLI, seed binary)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockplan-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐ │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │ │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │ │   │
//! │  │   │               │    │ RawMaterialRepo    │  │            │ │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo (+BOM) │  │ 001_*.sql  │ │   │
//! │  │   │ Settle gate   │    │ ProductionRepo     │  │            │ │   │
//! │  │   └───────────────┘    └─────────┬──────────┘  └────────────┘ │   │
//! │  │                                  │                              │   │
//! │  └──────────────────────────────────┼──────────────────────────────┘   │
//! │                                     ▼                                   │
//! │                     stockplan-core (allocation, clamping)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment-driven application configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockplan_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockplan.db")).await?;
//!
//! let plan = db.production().suggestions().await?;
//! for line in &plan.products {
//!     println!("{} x{}", line.product_name, line.quantity_possible);
//! }
//!
//! let result = db.production().settle(&product_id, 5).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::production::ProductionRepository;
pub use repository::raw_material::RawMaterialRepository;
