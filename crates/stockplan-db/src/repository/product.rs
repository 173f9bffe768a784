//! # Product Repository
//!
//! Database operations for products and their bills of materials.
//!
//! ## Key Operations
//! - Product CRUD
//! - BOM line maintenance (link, relink quantity, unlink)
//! - Catalog loading for the allocation engine
//!
//! ## Catalog Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How load_catalog Works                               │
//! │                                                                         │
//! │  Query 1: products ORDER BY price_cents DESC, id                       │
//! │  Query 2: product_raw_materials ⋈ raw_materials (all lines)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  group lines by product_id                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ProductWithMaterials>   (products without lines keep an empty     │
//! │                               Vec and are skipped by the engine)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both queries run on the same connection; inside a settlement they run on
//! the transaction so the engine sees one consistent snapshot.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::name_pattern;
use stockplan_core::validation::{validate_quantity_needed, validate_reference};
use stockplan_core::{
    BomLine, BomLineDetail, CoreError, NewProduct, Product, ProductChanges, ProductWithMaterials,
};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, description, price_cents, stock_quantity,
           created_at, updated_at
    FROM products
"#;

const SELECT_BOM_DETAIL: &str = r#"
    SELECT
        prm.id,
        prm.product_id,
        prm.raw_material_id,
        rm.name AS raw_material_name,
        rm.unit AS raw_material_unit,
        prm.quantity_needed,
        rm.stock_quantity AS raw_material_stock
    FROM product_raw_materials prm
    INNER JOIN raw_materials rm ON rm.id = prm.raw_material_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let table = repo.insert(&NewProduct { .. }).await?;
/// repo.add_raw_material(&table.id, &plank.id, 4).await?;
///
/// let with_bom = repo.get_with_materials(&table.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Product CRUD
    // =========================================================================

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row, with generated id and timestamps
    /// * `Err(DbError::Core(Validation))` - A field is out of range
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        new.validate()?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: new.name.trim().to_string(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            stock_quantity: new.stock_quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, stock_quantity,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets a product together with its bill of materials.
    pub async fn get_with_materials(&self, id: &str) -> DbResult<Option<ProductWithMaterials>> {
        let mut conn = self.pool.acquire().await?;

        let Some(product) = fetch_product(&mut conn, id).await? else {
            return Ok(None);
        };
        let raw_materials = fetch_materials(&mut conn, id).await?;

        Ok(Some(ProductWithMaterials {
            product,
            raw_materials,
        }))
    }

    /// Lists products by name, optionally filtered by a case-insensitive
    /// name fragment.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let pattern = name_pattern(search);
        let sql = format!(
            "{SELECT_PRODUCT} WHERE (?1 IS NULL OR lower(name) LIKE ?1) ORDER BY name, id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The row after the update
    /// * `Err(DbError::NotFound)` - No product with that id
    pub async fn update(&self, id: &str, changes: &ProductChanges) -> DbResult<Product> {
        changes.validate()?;

        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        changes.apply_to(&mut product);
        product.updated_at = Utc::now();

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock_quantity = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    /// Deletes a product. Its BOM lines go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Bill of Materials
    // =========================================================================

    /// Links a raw material to a product.
    ///
    /// ## Errors
    /// * `InvalidInput` - Missing id or `quantity_needed < 1`
    /// * `NotFound` - Unknown product or raw material
    /// * `InvalidState` - The pair is already linked
    pub async fn add_raw_material(
        &self,
        product_id: &str,
        raw_material_id: &str,
        quantity_needed: i64,
    ) -> DbResult<BomLine> {
        validate_reference("product_id", product_id)?;
        validate_reference("raw_material_id", raw_material_id)?;
        validate_quantity_needed(quantity_needed)?;

        debug!(
            product_id = %product_id,
            raw_material_id = %raw_material_id,
            quantity_needed,
            "Linking raw material"
        );

        let mut tx = self.pool.begin().await?;

        let product_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;
        if product_exists == 0 {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        let material_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM raw_materials WHERE id = ?1")
                .bind(raw_material_id)
                .fetch_one(&mut *tx)
                .await?;
        if material_exists == 0 {
            return Err(CoreError::RawMaterialNotFound(raw_material_id.to_string()).into());
        }

        let already_linked: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_raw_materials WHERE product_id = ?1 AND raw_material_id = ?2",
        )
        .bind(product_id)
        .bind(raw_material_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_linked > 0 {
            return Err(CoreError::DuplicateComponent {
                product_id: product_id.to_string(),
                raw_material_id: raw_material_id.to_string(),
            }
            .into());
        }

        let line = BomLine {
            id: generate_bom_line_id(),
            product_id: product_id.to_string(),
            raw_material_id: raw_material_id.to_string(),
            quantity_needed,
        };

        sqlx::query(
            r#"
            INSERT INTO product_raw_materials (id, product_id, raw_material_id, quantity_needed)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&line.id)
        .bind(&line.product_id)
        .bind(&line.raw_material_id)
        .bind(line.quantity_needed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(line)
    }

    /// Changes how much of a raw material one unit of the product needs.
    pub async fn update_raw_material_quantity(
        &self,
        product_id: &str,
        line_id: &str,
        quantity_needed: i64,
    ) -> DbResult<()> {
        validate_quantity_needed(quantity_needed)?;

        debug!(product_id = %product_id, line_id = %line_id, quantity_needed, "Updating BOM line");

        let result = sqlx::query(
            "UPDATE product_raw_materials SET quantity_needed = ?3 WHERE id = ?1 AND product_id = ?2",
        )
        .bind(line_id)
        .bind(product_id)
        .bind(quantity_needed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("BomLine", line_id));
        }

        Ok(())
    }

    /// Unlinks a raw material from a product.
    pub async fn remove_raw_material(&self, product_id: &str, line_id: &str) -> DbResult<()> {
        debug!(product_id = %product_id, line_id = %line_id, "Removing BOM line");

        let result =
            sqlx::query("DELETE FROM product_raw_materials WHERE id = ?1 AND product_id = ?2")
                .bind(line_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("BomLine", line_id));
        }

        Ok(())
    }

    /// The product's BOM lines joined with current raw-material stock.
    pub async fn materials(&self, product_id: &str) -> DbResult<Vec<BomLineDetail>> {
        let mut conn = self.pool.acquire().await?;

        if fetch_product(&mut conn, product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        fetch_materials(&mut conn, product_id).await
    }

    /// Every product with its BOM detail rows, in priority order.
    pub async fn load_catalog(&self) -> DbResult<Vec<ProductWithMaterials>> {
        let mut conn = self.pool.acquire().await?;
        fetch_catalog(&mut conn).await
    }
}

// =============================================================================
// Connection-level Reads
// =============================================================================
// Shared with the production repository, which runs them on its transaction.

pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!("{SELECT_PRODUCT} WHERE id = ?1");

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

pub(crate) async fn fetch_materials(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Vec<BomLineDetail>> {
    let sql = format!("{SELECT_BOM_DETAIL} WHERE prm.product_id = ?1 ORDER BY rm.name, prm.id");

    let lines = sqlx::query_as::<_, BomLineDetail>(&sql)
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(lines)
}

pub(crate) async fn fetch_catalog(
    conn: &mut SqliteConnection,
) -> DbResult<Vec<ProductWithMaterials>> {
    let sql = format!("{SELECT_PRODUCT} ORDER BY price_cents DESC, id ASC");
    let products = sqlx::query_as::<_, Product>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    let sql = format!("{SELECT_BOM_DETAIL} ORDER BY prm.product_id, rm.name, prm.id");
    let lines = sqlx::query_as::<_, BomLineDetail>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    let mut by_product: HashMap<String, Vec<BomLineDetail>> = HashMap::new();
    for line in lines {
        by_product
            .entry(line.product_id.clone())
            .or_default()
            .push(line);
    }

    let catalog: Vec<ProductWithMaterials> = products
        .into_iter()
        .map(|product| {
            let raw_materials = by_product.remove(&product.id).unwrap_or_default();
            ProductWithMaterials {
                product,
                raw_materials,
            }
        })
        .collect();

    debug!(products = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

/// Generates a new UUID for a product.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new UUID for a BOM line.
pub fn generate_bom_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
