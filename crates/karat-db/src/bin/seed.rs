//! # Seed Data Generator
//!
//! Populates a database file with a small showroom network for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./karat_dev.db
//! cargo run -p karat-db --bin seed
//!
//! # Specify database path
//! cargo run -p karat-db --bin seed -- --db ./data/karat.db
//! ```
//!
//! ## Generated Data
//! - Two branches: `MUM` (Mumbai) and `PUN` (Pune)
//! - Materials: Gold 22K, Gold 18K, Silver 925 with per-gram rates
//! - Weight-based gold jewellery and piece-rate silver articles, all stocked
//!   at Mumbai, with making charge, wastage and the odd stone value
//! - One sales return and one old-jewel voucher ready to be adjusted

use std::env;

use karat_core::{ChargeMode, Money, PricingMode};
use karat_db::repository::catalog::{NewItemDetail, NewProduct};
use karat_db::{Database, DbConfig};

/// (name, rate per gram in paise)
const MATERIALS: &[(&str, i64)] = &[
    ("Gold 22K", 625_000),
    ("Gold 18K", 512_000),
    ("Silver 925", 9_500),
];

/// A seeded article: material index, pricing mode and one stocked item.
struct Article {
    sku: &'static str,
    name: &'static str,
    hsn: &'static str,
    category: &'static str,
    material: usize,
    mode: PricingMode,
    quantity: i64,
    net_weight_mg: i64,
    gross_weight_mg: i64,
    stone_value_cents: i64,
    rate_per_gram_cents: i64,
    making: (ChargeMode, i64),
    wastage: (ChargeMode, i64),
}

const ARTICLES: &[Article] = &[
    Article {
        sku: "GR-22-001",
        name: "Plain Gold Band",
        hsn: "7113",
        category: "rings",
        material: 0,
        mode: PricingMode::WeightBased,
        quantity: 12,
        net_weight_mg: 4_250,
        gross_weight_mg: 4_250,
        stone_value_cents: 0,
        rate_per_gram_cents: 0,
        making: (ChargeMode::Percentage, 1_200),
        wastage: (ChargeMode::Percentage, 300),
    },
    Article {
        sku: "GC-22-014",
        name: "Rope Chain 20in",
        hsn: "7113",
        category: "chains",
        material: 0,
        mode: PricingMode::WeightBased,
        quantity: 6,
        net_weight_mg: 15_600,
        gross_weight_mg: 15_600,
        stone_value_cents: 0,
        rate_per_gram_cents: 0,
        making: (ChargeMode::PerGram, 45_000),
        wastage: (ChargeMode::Percentage, 500),
    },
    Article {
        sku: "GE-18-220",
        name: "Solitaire Stud Pair",
        hsn: "7113",
        category: "earrings",
        material: 1,
        mode: PricingMode::WeightBased,
        quantity: 4,
        net_weight_mg: 2_100,
        gross_weight_mg: 2_400,
        stone_value_cents: 3_500_000,
        rate_per_gram_cents: 0,
        making: (ChargeMode::Amount, 250_000),
        wastage: (ChargeMode::Amount, 0),
    },
    Article {
        sku: "SA-925-031",
        name: "Silver Pooja Thali",
        hsn: "7114",
        category: "articles",
        material: 2,
        mode: PricingMode::PieceRate,
        quantity: 20,
        net_weight_mg: 180_000,
        gross_weight_mg: 182_500,
        stone_value_cents: 0,
        rate_per_gram_cents: 11_000,
        making: (ChargeMode::Amount, 150_000),
        wastage: (ChargeMode::Amount, 0),
    },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./karat_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Karat Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./karat_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Karat Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.branches().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} branches", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mumbai = db.branches().insert("MUM", "Mumbai Flagship").await?;
    let pune = db.branches().insert("PUN", "Pune Showroom").await?;
    println!("✓ Branches: {} ({}), {} ({})", mumbai.code, mumbai.id, pune.code, pune.id);

    let mut material_ids = Vec::with_capacity(MATERIALS.len());
    for (name, rate) in MATERIALS {
        let material = db.materials().insert(name, Money::from_cents(*rate)).await?;
        println!("✓ Material {} at {}/g", material.name, material.price_per_gram());
        material_ids.push(material.id);
    }

    println!();
    println!("Generating stock at {}...", mumbai.code);

    for article in ARTICLES {
        let product = db
            .catalog()
            .insert_product(&NewProduct {
                sku: article.sku.to_string(),
                hsn_code: Some(article.hsn.to_string()),
                name: article.name.to_string(),
                material_id: Some(material_ids[article.material].clone()),
                category_id: Some(article.category.to_string()),
                subcategory_id: None,
                pricing_mode: article.mode,
                branch_id: mumbai.id.clone(),
            })
            .await?;

        let item = db
            .catalog()
            .insert_item(
                &product.id,
                &NewItemDetail {
                    sku: format!("{}-A", article.sku),
                    quantity: article.quantity,
                    net_weight_mg: article.net_weight_mg,
                    gross_weight_mg: article.gross_weight_mg,
                    stone_value_cents: article.stone_value_cents,
                    rate_per_gram_cents: article.rate_per_gram_cents,
                    making_charge_mode: article.making.0,
                    making_charge_value: article.making.1,
                    wastage_mode: article.wastage.0,
                    wastage_value: article.wastage.1,
                },
            )
            .await?;

        if article.stone_value_cents > 0 {
            db.catalog()
                .add_item_charge(&item.id, "IGI certificate", Money::from_major(1_500))
                .await?;
        }

        let quote = db.catalog().quote(&product.id, &item.id).await?;
        println!(
            "  {:<12} {:<22} qty {:>3}  selling {:>14}  final {:>14}",
            product.sku, product.name, item.quantity, quote.selling_price, quote.final_price
        );
    }

    println!();
    let sales_return = db
        .adjustments()
        .insert_sales_return("SR/2024-25/0001", Money::from_major(5_000))
        .await?;
    let old_jewel = db
        .adjustments()
        .insert_old_jewel("OJ/2024-25/0001", Money::from_major(18_500))
        .await?;
    println!("✓ Sales return {} ready for adjustment", sales_return.id);
    println!("✓ Old jewel voucher {} ready for adjustment", old_jewel.id);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
