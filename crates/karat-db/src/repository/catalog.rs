//! # Catalog Repository
//!
//! Products, their stock-bearing item details and the satellite rows a
//! stock transfer carries along when it clones a product.
//!
//! ## Stock Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product_item_details.quantity is the only stock counter.              │
//! │                                                                         │
//! │  decrement:  UPDATE … SET quantity = quantity − n                      │
//! │              WHERE id = ? AND quantity >= n                            │
//! │              0 rows → missing item or not enough stock                 │
//! │                                                                         │
//! │  One statement, so two concurrent sales of the last piece cannot both  │
//! │  read "1 left" and both write "0".                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use karat_core::pricing::{self, PriceQuote, PricingInput};
use karat_core::{
    ChargeMode, CoreError, EngineSettings, ItemCharge, Money, PricingMode, Product,
    ProductAddOn, ProductAdditionalDetail, ProductItemDetail, ProductVariant,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::material;

const PRODUCT_COLUMNS: &str = "id, sku, hsn_code, name, material_id, category_id, \
     subcategory_id, pricing_mode, branch_id, is_deleted, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, product_id, sku, quantity, net_weight_mg, gross_weight_mg, \
     stone_value_cents, rate_per_gram_cents, making_charge_mode, making_charge_value, \
     wastage_mode, wastage_value, is_transfer_item, created_at, updated_at";

// =============================================================================
// Inputs
// =============================================================================

/// Catalog attributes of a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub hsn_code: Option<String>,
    pub name: String,
    pub material_id: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub pricing_mode: PricingMode,
    pub branch_id: String,
}

/// Stock and pricing attributes of a new item detail.
#[derive(Debug, Clone)]
pub struct NewItemDetail {
    pub sku: String,
    pub quantity: i64,
    pub net_weight_mg: i64,
    pub gross_weight_mg: i64,
    pub stone_value_cents: i64,
    pub rate_per_gram_cents: i64,
    pub making_charge_mode: ChargeMode,
    pub making_charge_value: i64,
    pub wastage_mode: ChargeMode,
    pub wastage_value: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog reads and writes.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
    settings: EngineSettings,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool, settings: EngineSettings) -> Self {
        CatalogRepository { pool, settings }
    }

    /// Inserts a product.
    pub async fn insert_product(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: new.sku.clone(),
            hsn_code: new.hsn_code.clone(),
            name: new.name.clone(),
            material_id: new.material_id.clone(),
            category_id: new.category_id.clone(),
            subcategory_id: new.subcategory_id.clone(),
            pricing_mode: new.pricing_mode,
            branch_id: new.branch_id.clone(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.acquire().await?;
        insert_product(&mut conn, &product).await?;
        Ok(product)
    }

    /// Inserts a stock-bearing item under a product.
    pub async fn insert_item(&self, product_id: &str, new: &NewItemDetail) -> DbResult<ProductItemDetail> {
        let now = Utc::now();
        let item = ProductItemDetail {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            sku: new.sku.clone(),
            quantity: new.quantity,
            net_weight_mg: new.net_weight_mg,
            gross_weight_mg: new.gross_weight_mg,
            stone_value_cents: new.stone_value_cents,
            rate_per_gram_cents: new.rate_per_gram_cents,
            making_charge_mode: new.making_charge_mode,
            making_charge_value: new.making_charge_value,
            wastage_mode: new.wastage_mode,
            wastage_value: new.wastage_value,
            is_transfer_item: false,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.acquire().await?;
        insert_item(&mut conn, &item).await?;
        Ok(item)
    }

    /// Gets a live (non-deleted) product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets an item detail by ID.
    pub async fn get_item(&self, id: &str) -> DbResult<Option<ProductItemDetail>> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, id).await
    }

    /// Lists the item details of a product, oldest first.
    pub async fn list_items(&self, product_id: &str) -> DbResult<Vec<ProductItemDetail>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM product_item_details WHERE product_id = ?1 \
             ORDER BY created_at, rowid"
        );
        let items = sqlx::query_as::<_, ProductItemDetail>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Lists live products owned by a branch.
    pub async fn list_products_by_branch(&self, branch_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE branch_id = ?1 AND is_deleted = 0 \
             ORDER BY created_at, rowid"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(branch_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Soft-deletes a product.
    pub async fn soft_delete_product(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    // =========================================================================
    // Satellite rows
    // =========================================================================

    pub async fn add_additional_detail(
        &self,
        product_id: &str,
        label: &str,
        value: &str,
    ) -> DbResult<ProductAdditionalDetail> {
        let row = ProductAdditionalDetail {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        };
        sqlx::query(
            "INSERT INTO product_additional_details (id, product_id, label, value) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&row.id)
        .bind(&row.product_id)
        .bind(&row.label)
        .bind(&row.value)
        .execute(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_additional_details(
        &self,
        product_id: &str,
    ) -> DbResult<Vec<ProductAdditionalDetail>> {
        let rows = sqlx::query_as::<_, ProductAdditionalDetail>(
            "SELECT id, product_id, label, value FROM product_additional_details \
             WHERE product_id = ?1 ORDER BY rowid",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn add_variant(&self, product_id: &str, variant_id: &str) -> DbResult<ProductVariant> {
        let row = ProductVariant {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            variant_id: variant_id.to_string(),
        };
        sqlx::query("INSERT INTO product_variants (id, product_id, variant_id) VALUES (?1, ?2, ?3)")
            .bind(&row.id)
            .bind(&row.product_id)
            .bind(&row.variant_id)
            .execute(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_variants(&self, product_id: &str) -> DbResult<Vec<ProductVariant>> {
        let rows = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, variant_id FROM product_variants \
             WHERE product_id = ?1 ORDER BY rowid",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn add_add_on(&self, product_id: &str, add_on_id: &str) -> DbResult<ProductAddOn> {
        let row = ProductAddOn {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            add_on_id: add_on_id.to_string(),
        };
        sqlx::query("INSERT INTO product_add_ons (id, product_id, add_on_id) VALUES (?1, ?2, ?3)")
            .bind(&row.id)
            .bind(&row.product_id)
            .bind(&row.add_on_id)
            .execute(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_add_ons(&self, product_id: &str) -> DbResult<Vec<ProductAddOn>> {
        let rows = sqlx::query_as::<_, ProductAddOn>(
            "SELECT id, product_id, add_on_id FROM product_add_ons \
             WHERE product_id = ?1 ORDER BY rowid",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Adds an item-level additional charge (hallmarking, certificate, ...).
    pub async fn add_item_charge(
        &self,
        item_id: &str,
        label: &str,
        amount: Money,
    ) -> DbResult<ItemCharge> {
        let row = ItemCharge {
            id: Uuid::new_v4().to_string(),
            product_item_detail_id: item_id.to_string(),
            label: label.to_string(),
            amount_cents: amount.cents(),
        };
        sqlx::query(
            "INSERT INTO item_charges (id, product_item_detail_id, label, amount_cents) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&row.id)
        .bind(&row.product_item_detail_id)
        .bind(&row.label)
        .bind(row.amount_cents)
        .execute(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_item_charges(&self, item_id: &str) -> DbResult<Vec<ItemCharge>> {
        let mut conn = self.pool.acquire().await?;
        fetch_item_charges(&mut conn, item_id).await
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Prices one unit of `item_id` under `product_id`.
    ///
    /// Uses the injected finished-goods tax rate. A product without a known
    /// material prices its metal at zero.
    pub async fn quote(&self, product_id: &str, item_id: &str) -> DbResult<PriceQuote> {
        let mut conn = self.pool.acquire().await?;

        let (product, item) = fetch_product_and_item(&mut conn, product_id, item_id).await?;
        let rate = material::price_per_gram(&mut conn, product.material_id.as_deref()).await?;
        let charges = fetch_item_charges(&mut conn, item_id).await?;

        let input = PricingInput::from_rows(&product, &item, rate, &charges);
        let quote = pricing::quote(&input, self.settings.finished_goods_tax);

        debug!(
            product_id = %product_id,
            item_id = %item_id,
            selling = %quote.selling_price,
            final_price = %quote.final_price,
            "Priced item"
        );
        Ok(quote)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_deleted = 0");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(product)
}

pub(crate) async fn fetch_item(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<ProductItemDetail>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM product_item_details WHERE id = ?1");
    let item = sqlx::query_as::<_, ProductItemDetail>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

/// Loads a live product and one of its items, checking they belong together.
pub(crate) async fn fetch_product_and_item(
    conn: &mut SqliteConnection,
    product_id: &str,
    item_id: &str,
) -> DbResult<(Product, ProductItemDetail)> {
    let product = fetch_product(conn, product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", product_id))?;
    let item = fetch_item(conn, item_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product item detail", item_id))?;
    if item.product_id != product.id {
        return Err(CoreError::InvalidReference {
            product_id: product_id.to_string(),
            item_id: item_id.to_string(),
        }
        .into());
    }
    Ok((product, item))
}

pub(crate) async fn fetch_item_charges(
    conn: &mut SqliteConnection,
    item_id: &str,
) -> DbResult<Vec<ItemCharge>> {
    let rows = sqlx::query_as::<_, ItemCharge>(
        "SELECT id, product_item_detail_id, label, amount_cents FROM item_charges \
         WHERE product_item_detail_id = ?1 ORDER BY rowid",
    )
    .bind(item_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub(crate) async fn insert_product(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(id = %product.id, sku = %product.sku, branch_id = %product.branch_id, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, sku, hsn_code, name, material_id, category_id, subcategory_id,
            pricing_mode, branch_id, is_deleted, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&product.id)
    .bind(&product.sku)
    .bind(&product.hsn_code)
    .bind(&product.name)
    .bind(&product.material_id)
    .bind(&product.category_id)
    .bind(&product.subcategory_id)
    .bind(product.pricing_mode)
    .bind(&product.branch_id)
    .bind(product.is_deleted)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &ProductItemDetail) -> DbResult<()> {
    debug!(id = %item.id, sku = %item.sku, quantity = item.quantity, "Inserting item detail");

    sqlx::query(
        r#"
        INSERT INTO product_item_details (
            id, product_id, sku, quantity, net_weight_mg, gross_weight_mg,
            stone_value_cents, rate_per_gram_cents, making_charge_mode, making_charge_value,
            wastage_mode, wastage_value, is_transfer_item, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&item.id)
    .bind(&item.product_id)
    .bind(&item.sku)
    .bind(item.quantity)
    .bind(item.net_weight_mg)
    .bind(item.gross_weight_mg)
    .bind(item.stone_value_cents)
    .bind(item.rate_per_gram_cents)
    .bind(item.making_charge_mode)
    .bind(item.making_charge_value)
    .bind(item.wastage_mode)
    .bind(item.wastage_value)
    .bind(item.is_transfer_item)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Takes `quantity` pieces off an item.
///
/// Fails with `InsufficientStock` (or `NotFound`) without changing anything
/// when the item cannot cover the request.
pub(crate) async fn decrement_stock(
    conn: &mut SqliteConnection,
    item_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE product_item_details
        SET quantity = quantity - ?1, updated_at = ?2
        WHERE id = ?3 AND quantity >= ?1
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(item_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let item = fetch_item(conn, item_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product item detail", item_id))?;
        return Err(CoreError::InsufficientStock {
            sku: item.sku,
            available: item.quantity,
            requested: quantity,
        }
        .into());
    }

    debug!(item_id = %item_id, quantity, "Stock decremented");
    Ok(())
}

/// Adds `quantity` pieces to an item.
pub(crate) async fn increment_stock(
    conn: &mut SqliteConnection,
    item_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE product_item_details
        SET quantity = quantity + ?1, updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(item_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::not_found("Product item detail", item_id).into());
    }

    debug!(item_id = %item_id, quantity, "Stock incremented");
    Ok(())
}

/// Copies additional details, variants, add-ons from one product to another.
pub(crate) async fn copy_product_satellites(
    conn: &mut SqliteConnection,
    from_product_id: &str,
    to_product_id: &str,
) -> DbResult<()> {
    let details = sqlx::query_as::<_, ProductAdditionalDetail>(
        "SELECT id, product_id, label, value FROM product_additional_details \
         WHERE product_id = ?1 ORDER BY rowid",
    )
    .bind(from_product_id)
    .fetch_all(&mut *conn)
    .await?;
    for detail in &details {
        sqlx::query(
            "INSERT INTO product_additional_details (id, product_id, label, value) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(to_product_id)
        .bind(&detail.label)
        .bind(&detail.value)
        .execute(&mut *conn)
        .await?;
    }

    let variants = sqlx::query_as::<_, ProductVariant>(
        "SELECT id, product_id, variant_id FROM product_variants WHERE product_id = ?1 ORDER BY rowid",
    )
    .bind(from_product_id)
    .fetch_all(&mut *conn)
    .await?;
    for variant in &variants {
        sqlx::query("INSERT INTO product_variants (id, product_id, variant_id) VALUES (?1, ?2, ?3)")
            .bind(Uuid::new_v4().to_string())
            .bind(to_product_id)
            .bind(&variant.variant_id)
            .execute(&mut *conn)
            .await?;
    }

    let add_ons = sqlx::query_as::<_, ProductAddOn>(
        "SELECT id, product_id, add_on_id FROM product_add_ons WHERE product_id = ?1 ORDER BY rowid",
    )
    .bind(from_product_id)
    .fetch_all(&mut *conn)
    .await?;
    for add_on in &add_ons {
        sqlx::query("INSERT INTO product_add_ons (id, product_id, add_on_id) VALUES (?1, ?2, ?3)")
            .bind(Uuid::new_v4().to_string())
            .bind(to_product_id)
            .bind(&add_on.add_on_id)
            .execute(&mut *conn)
            .await?;
    }

    debug!(
        from = %from_product_id,
        to = %to_product_id,
        details = details.len(),
        variants = variants.len(),
        add_ons = add_ons.len(),
        "Copied product satellites"
    );
    Ok(())
}

/// Copies the item-level additional charges of one item onto another.
pub(crate) async fn copy_item_charges(
    conn: &mut SqliteConnection,
    from_item_id: &str,
    to_item_id: &str,
) -> DbResult<()> {
    for charge in fetch_item_charges(conn, from_item_id).await? {
        sqlx::query(
            "INSERT INTO item_charges (id, product_item_detail_id, label, amount_cents) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(to_item_id)
        .bind(&charge.label)
        .bind(charge.amount_cents)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = test_support::db().await;
        let branch = test_support::branch(&db, "MUM").await;
        let (product, item) = test_support::stocked_product(&db, "RING-01", &branch.id, 5).await;

        let loaded = db.catalog().get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.pricing_mode, PricingMode::WeightBased);
        assert_eq!(loaded.branch_id, branch.id);

        let items = db.catalog().list_items(&product.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, item.id);
        assert_eq!(items[0].making_charge_mode, ChargeMode::Percentage);
        assert!(!items[0].is_transfer_item);

        let listed = db.catalog().list_products_by_branch(&branch.id).await.unwrap();
        assert_eq!(listed.len(), 1);

        db.catalog().soft_delete_product(&product.id).await.unwrap();
        assert!(db.catalog().get_product(&product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conditional_decrement() {
        let db = test_support::db().await;
        let branch = test_support::branch(&db, "MUM").await;
        let (_, item) = test_support::stocked_product(&db, "RING-02", &branch.id, 3).await;

        let mut conn = db.pool().acquire().await.unwrap();
        decrement_stock(&mut conn, &item.id, 2).await.unwrap();

        let err = decrement_stock(&mut conn, &item.id, 2).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        increment_stock(&mut conn, &item.id, 4).await.unwrap();
        drop(conn);

        let item = db.catalog().get_item(&item.id).await.unwrap().unwrap();
        assert_eq!(item.quantity, 5);
    }

    #[tokio::test]
    async fn test_quote_uses_material_rate_and_charges() {
        let db = test_support::db().await;
        let branch = test_support::branch(&db, "MUM").await;
        let (product, item) = test_support::stocked_product(&db, "RING-03", &branch.id, 1).await;
        db.catalog()
            .add_item_charge(&item.id, "Hallmarking", Money::from_cents(4_500))
            .await
            .unwrap();

        let quote = db.catalog().quote(&product.id, &item.id).await.unwrap();
        // 4.500 g × ₹6,250.00 = ₹28,125.00
        assert_eq!(quote.contribution.cents(), 2_812_500);
        // 12% making
        assert_eq!(quote.making_charge.cents(), 337_500);
        assert_eq!(quote.additional_charges.cents(), 4_500);
        assert_eq!(quote.selling_price.cents(), 2_812_500 + 337_500 + 4_500);
        assert_eq!(quote.final_price, quote.selling_price + quote.tax);
    }

    #[tokio::test]
    async fn test_quote_without_material_is_zero_rated() {
        let db = test_support::db().await;
        let branch = test_support::branch(&db, "MUM").await;
        let product = db
            .catalog()
            .insert_product(&test_support::new_product("CHAIN-01", &branch.id, None))
            .await
            .unwrap();
        let item = db
            .catalog()
            .insert_item(&product.id, &test_support::new_item("CHAIN-01-A", 1))
            .await
            .unwrap();

        let quote = db.catalog().quote(&product.id, &item.id).await.unwrap();
        assert!(quote.contribution.is_zero());
        assert!(quote.final_price.is_zero());
    }

    #[tokio::test]
    async fn test_quote_rejects_foreign_item() {
        let db = test_support::db().await;
        let branch = test_support::branch(&db, "MUM").await;
        let (product, _) = test_support::stocked_product(&db, "RING-04", &branch.id, 1).await;
        let (_, other_item) = test_support::stocked_product(&db, "RING-05", &branch.id, 1).await;

        let err = db.catalog().quote(&product.id, &other_item.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidReference { .. })
        ));
        assert!(matches!(
            db.catalog().quote("missing", &other_item.id).await,
            Err(DbError::Domain(CoreError::NotFound { .. }))
        ));
    }
}
