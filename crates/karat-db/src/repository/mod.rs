//! # Repository Module
//!
//! Database repository implementations for the Karat engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Workflows                           │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.invoices().create(request)                                 │
//! │       ▼                                                                 │
//! │  Workflow repositories (own a transaction per call)                    │
//! │  ├── InvoiceRepository   create / update / get_bundle                  │
//! │  └── TransferRepository  create / update_status / get_bundle           │
//! │       │                                                                 │
//! │       │  reuse connection-level helpers inside the transaction          │
//! │       ▼                                                                 │
//! │  Collaborator repositories                                             │
//! │  ├── CatalogRepository     products, item details, stock, quotes       │
//! │  ├── AdjustmentRepository  validate / lock credit documents            │
//! │  ├── BranchRepository      existence checks                            │
//! │  ├── MaterialRepository    published rates                             │
//! │  └── SeriesRepository      fiscal document numbers                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every collaborator exposes its SQL twice: as a pool-backed method for
//! direct use and as a `pub(crate)` function over `&mut SqliteConnection`
//! so a workflow can run it inside its own transaction.

pub mod adjustment;
pub mod branch;
pub mod catalog;
pub mod invoice;
pub mod material;
pub mod series;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use karat_core::{
        Branch, ChargeMode, Money, PricingMode, Product, ProductItemDetail,
    };

    use crate::repository::catalog::{NewItemDetail, NewProduct};
    use crate::{Database, DbConfig};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn branch(db: &Database, code: &str) -> Branch {
        db.branches()
            .insert(code, &format!("{code} showroom"))
            .await
            .unwrap()
    }

    pub fn new_product(sku: &str, branch_id: &str, material_id: Option<String>) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            hsn_code: Some("7113".to_string()),
            name: format!("{sku} ring"),
            material_id,
            category_id: Some("rings".to_string()),
            subcategory_id: None,
            pricing_mode: PricingMode::WeightBased,
            branch_id: branch_id.to_string(),
        }
    }

    pub fn new_item(sku: &str, quantity: i64) -> NewItemDetail {
        NewItemDetail {
            sku: sku.to_string(),
            quantity,
            net_weight_mg: 4_500,
            gross_weight_mg: 4_800,
            stone_value_cents: 0,
            rate_per_gram_cents: 0,
            making_charge_mode: ChargeMode::Percentage,
            making_charge_value: 1200,
            wastage_mode: ChargeMode::Amount,
            wastage_value: 0,
        }
    }

    /// A product with one stock-bearing item at `branch_id`.
    pub async fn stocked_product(
        db: &Database,
        sku: &str,
        branch_id: &str,
        quantity: i64,
    ) -> (Product, ProductItemDetail) {
        let material = db
            .materials()
            .insert(&format!("22K-{sku}"), Money::from_cents(625_000))
            .await
            .unwrap();
        let product = db
            .catalog()
            .insert_product(&new_product(sku, branch_id, Some(material.id)))
            .await
            .unwrap();
        let item = db
            .catalog()
            .insert_item(&product.id, &new_item(&format!("{sku}-A"), quantity))
            .await
            .unwrap();
        (product, item)
    }
}
