//! # Seed Data Generator
//!
//! Populates the database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./lavka_dev.db)
//! cargo run -p lavka-db --bin seed
//!
//! # Specify database path
//! cargo run -p lavka-db --bin seed -- --db ./data/lavka.db
//! ```
//!
//! Seeds a small catalog across a few categories plus two promo codes
//! (`WELCOME10`, `SALE20`). Skips seeding when products already exist.

use std::env;

use lavka_core::NewProduct;
use lavka_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (name, category, price_minor, cost_minor, stock)
const PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("Mango Ice 30ml", "liquids", 1200, 600, 25),
    ("Berry Mix 30ml", "liquids", 1200, 600, 30),
    ("Cool Mint 30ml", "liquids", 1100, 550, 40),
    ("Grape Soda 30ml", "liquids", 1300, 700, 15),
    ("Pod Kit Black", "devices", 4500, 2800, 8),
    ("Pod Kit Silver", "devices", 4500, 2800, 6),
    ("Replacement Coil x3", "parts", 900, 400, 60),
    ("Empty Pod x2", "parts", 700, 300, 50),
    ("USB-C Cable", "parts", 400, 150, 35),
    ("Carry Case", "accessories", 800, 350, 20),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./lavka_dev.db");

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
                println!("Lavka Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./lavka_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Lavka Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    for (name, category, price_minor, cost_minor, stock) in PRODUCTS {
        let product = db
            .products()
            .insert(&NewProduct {
                name: name.to_string(),
                category: Some(category.to_string()),
                description: None,
                price_minor: *price_minor,
                cost_minor: *cost_minor,
                image_ref: None,
                stock: *stock,
            })
            .await?;
        println!("  [{}] {}", product.id, product.name);
    }

    db.promo_codes().create("WELCOME10", 10).await?;
    db.promo_codes().create("SALE20", 20).await?;
    println!("  + promo WELCOME10 (10%)");
    println!("  + promo SALE20 (20%)");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
