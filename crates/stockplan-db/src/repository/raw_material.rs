//! # Raw Material Repository
//!
//! CRUD for the stocked inputs consumed by production.
//!
//! Stock written here is an absolute correction (a stock count, a delivery
//! entered by hand). Production never goes through this repository; it
//! writes deltas from [`super::production`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::name_pattern;
use stockplan_core::{NewRawMaterial, RawMaterial, RawMaterialChanges, DEFAULT_UNIT};

const SELECT_RAW_MATERIAL: &str = r#"
    SELECT id, name, description, price_cents, stock_quantity, unit,
           created_at, updated_at
    FROM raw_materials
"#;

/// Repository for raw material database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = RawMaterialRepository::new(pool);
///
/// let steel = repo.insert(&NewRawMaterial { .. }).await?;
/// let all = repo.list(None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RawMaterialRepository {
    pool: SqlitePool,
}

impl RawMaterialRepository {
    /// Creates a new RawMaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RawMaterialRepository { pool }
    }

    /// Inserts a new raw material.
    ///
    /// ## Returns
    /// * `Ok(RawMaterial)` - The stored row, with generated id and timestamps
    /// * `Err(DbError::Core(Validation))` - A field is out of range
    pub async fn insert(&self, new: &NewRawMaterial) -> DbResult<RawMaterial> {
        new.validate()?;

        let now = Utc::now();
        let material = RawMaterial {
            id: generate_raw_material_id(),
            name: new.name.trim().to_string(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            stock_quantity: new.stock_quantity,
            unit: new
                .unit
                .as_deref()
                .map(str::trim)
                .unwrap_or(DEFAULT_UNIT)
                .to_string(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %material.id, name = %material.name, "Inserting raw material");

        sqlx::query(
            r#"
            INSERT INTO raw_materials (
                id, name, description, price_cents, stock_quantity, unit,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&material.id)
        .bind(&material.name)
        .bind(&material.description)
        .bind(material.price_cents)
        .bind(material.stock_quantity)
        .bind(&material.unit)
        .bind(material.created_at)
        .bind(material.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(material)
    }

    /// Gets a raw material by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(RawMaterial))` - Found
    /// * `Ok(None)` - Not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RawMaterial>> {
        let sql = format!("{SELECT_RAW_MATERIAL} WHERE id = ?1");

        let material = sqlx::query_as::<_, RawMaterial>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(material)
    }

    /// Lists raw materials ordered by name, optionally filtered by a
    /// case-insensitive name fragment.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<RawMaterial>> {
        let pattern = name_pattern(search);
        let sql = format!(
            "{SELECT_RAW_MATERIAL} WHERE (?1 IS NULL OR lower(name) LIKE ?1) ORDER BY name, id"
        );

        let materials = sqlx::query_as::<_, RawMaterial>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = materials.len(), "Listed raw materials");
        Ok(materials)
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(RawMaterial)` - The row after the update
    /// * `Err(DbError::NotFound)` - No raw material with that id
    pub async fn update(&self, id: &str, changes: &RawMaterialChanges) -> DbResult<RawMaterial> {
        changes.validate()?;

        let mut material = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("RawMaterial", id))?;

        changes.apply_to(&mut material);
        material.updated_at = Utc::now();

        debug!(id = %id, "Updating raw material");

        let result = sqlx::query(
            r#"
            UPDATE raw_materials SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock_quantity = ?5,
                unit = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&material.id)
        .bind(&material.name)
        .bind(&material.description)
        .bind(material.price_cents)
        .bind(material.stock_quantity)
        .bind(&material.unit)
        .bind(material.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RawMaterial", id));
        }

        Ok(material)
    }

    /// Deletes a raw material.
    ///
    /// Refused while any product still lists it in its bill of materials.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting raw material");

        let in_use: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_raw_materials WHERE raw_material_id = ?1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if in_use > 0 {
            return Err(DbError::ForeignKeyViolation {
                message: format!("raw material {id} is used by {in_use} bill of materials line(s)"),
            });
        }

        let result = sqlx::query("DELETE FROM raw_materials WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RawMaterial", id));
        }

        Ok(())
    }

    /// Counts raw materials.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM raw_materials")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new UUID for a raw material.
pub fn generate_raw_material_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
