//! # Seed Data Generator
//!
//! Populates a development database with furniture products, the raw
//! materials they are built from, and their bills of materials.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by STOCKPLAN_DB_PATH (default ./stockplan_dev.db)
//! cargo run -p stockplan-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockplan-db --bin seed -- --db ./data/stockplan.db
//!
//! # Seed, then commit the whole suggestion list
//! cargo run -p stockplan-db --bin seed -- --confirm
//! ```
//!
//! ## Generated Data
//! - 50 raw materials, stock 50 - 1000, unit cost $5.00 - $200.00
//! - 30 products, price $100.00 - $5000.00
//! - 2 - 6 BOM lines per product, 1 - 10 units needed per line
//!
//! Values are derived from each row's index, so every run produces the
//! same catalog.

use std::env;

use stockplan_core::{NewProduct, NewRawMaterial};
use stockplan_db::{AppConfig, Database};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PRODUCT_NAMES: &[&str] = &[
    "Premium Dining Table",
    "Upholstered Chair",
    "Double Wardrobe",
    "Kitchen Cabinet",
    "Modern Desk",
    "Bookshelf",
    "Queen Size Bed",
    "TV Stand",
    "Coffee Table",
    "Workbench",
    "Accent Armchair",
    "Nightstand",
    "6-Drawer Dresser",
    "Sideboard",
    "Folding Table",
    "Vertical Shoe Rack",
    "Office Drawer Unit",
    "TV Wall Panel",
    "Wooden Bench",
    "Decorative Niche",
    "6-Seat Dining Table",
    "Swivel Office Chair",
    "Single Wardrobe",
    "Utility Cabinet",
    "Compact Desk",
    "Industrial Shelf",
    "Single Box Bed",
    "Floating TV Rack",
    "Side Table",
    "Gourmet Counter",
];

const RAW_MATERIAL_NAMES: &[&str] = &[
    "Wood Plank",
    "MDF Panel",
    "Screw",
    "Varnish",
    "Acrylic Paint",
    "Steel Bar",
    "Metal Rail",
    "Hinge",
    "Handle",
    "Foam",
    "Fabric",
    "Tempered Glass",
    "Industrial Glue",
    "Sandpaper",
    "Caster",
    "Nail",
    "Corner Bracket",
    "Metal Tube",
    "Plywood",
    "Laminate Veneer",
    "Pine Plank",
    "Raw MDF Panel",
    "Phillips Screw",
    "Marine Varnish",
    "White Paint",
    "Aluminium Bar",
    "Telescopic Rail",
    "Pressure Hinge",
    "Aluminium Handle",
    "D28 Foam",
    "Suede Fabric",
    "Plain Glass",
    "Contact Cement",
    "Wet Sandpaper",
    "Swivel Caster",
    "Galvanized Nail",
    "Steel Corner",
    "Round Tube",
    "Marine Plywood",
    "PVC Veneer",
    "Edge Banding",
    "Hex Bolt",
    "Adhesive Felt",
    "Drawer Slide",
    "MDF Sheet",
    "Table Leg",
    "Shelf Support",
    "Furniture Lock",
    "Door Damper",
    "Metal Hook",
];

const UNITS: &[&str] = &["un", "m", "m²", "kg", "L", "pc"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_filter);

    let args: Vec<String> = env::args().collect();

    let mut db_config = config.db_config();
    let mut confirm = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--confirm" => confirm = true,
            "--help" | "-h" => {
                println!("StockPlan Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STOCKPLAN_DB_PATH)");
                println!("      --confirm      Commit the suggestion list after seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("StockPlan Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_config.database_path.display());
    println!();

    let db = Database::new(db_config).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
    } else {
        seed(&db).await?;
    }

    let suggestions = if confirm {
        db.production().confirm_suggestions().await?
    } else {
        db.production().suggestions().await?
    };

    println!();
    println!(
        "{} suggestions, grand total {}:",
        if confirm { "Committed" } else { "Current" },
        suggestions.grand_total_value
    );
    println!("{}", serde_json::to_string_pretty(&suggestions)?);

    db.close().await;
    Ok(())
}

/// Inserts the deterministic catalog.
async fn seed(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();

    let mut raw_material_ids = Vec::with_capacity(RAW_MATERIAL_NAMES.len());
    for (idx, name) in RAW_MATERIAL_NAMES.iter().enumerate() {
        let material = db.raw_materials().insert(&raw_material(idx, name)).await?;
        raw_material_ids.push(material.id);
    }

    let mut lines = 0;
    for (idx, name) in PRODUCT_NAMES.iter().enumerate() {
        let product = db.products().insert(&product(idx, name)).await?;

        // 2-6 distinct materials, stepping through the list by a stride
        // coprime with its length
        let count = 2 + idx % 5;
        for n in 0..count {
            let rm_idx = (idx * 7 + n * 11) % raw_material_ids.len();
            let quantity_needed = 1 + ((idx + n * 3) % 10) as i64;

            db.products()
                .add_raw_material(&product.id, &raw_material_ids[rm_idx], quantity_needed)
                .await?;
            lines += 1;
        }
    }

    info!(
        raw_materials = RAW_MATERIAL_NAMES.len(),
        products = PRODUCT_NAMES.len(),
        bom_lines = lines,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    println!(
        "Seeded {} raw materials, {} products, {} BOM lines in {:?}",
        RAW_MATERIAL_NAMES.len(),
        PRODUCT_NAMES.len(),
        lines,
        start.elapsed()
    );
    Ok(())
}

fn raw_material(idx: usize, name: &str) -> NewRawMaterial {
    NewRawMaterial {
        name: name.to_string(),
        description: Some(format!("Material: {}", name)),
        price_cents: 500 + ((idx * 3_917) % 19_500) as i64,
        stock_quantity: 50 + ((idx * 173) % 951) as i64,
        unit: Some(UNITS[idx % UNITS.len()].to_string()),
    }
}

fn product(idx: usize, name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: Some(format!("Premium product: {}", name)),
        price_cents: 10_000 + ((idx * 61_343) % 490_000) as i64,
        stock_quantity: 0,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `STOCKPLAN_LOG` (or `RUST_LOG`) selects the filter; default is `info`.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new("info,stockplan=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
