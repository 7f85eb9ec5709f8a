//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and ledger history for development.
//!
//! ## Usage
//! ```bash
//! # 30 days of history (default)
//! cargo run -p bizhome-db --bin seed
//!
//! # Longer history
//! cargo run -p bizhome-db --bin seed -- --days 90
//!
//! # Specify database path
//! cargo run -p bizhome-db --bin seed -- --db ./data/bizhome.db
//! ```
//!
//! ## Generated Data
//! - Five categories of a neighborhood store (granos, bebidas, limpieza, ...)
//! - Products with weighed and counted unit types, 20-60% markup
//! - Sales spread over the last N days, each within available stock
//! - Household expenses with descriptions that hit the expense classifier
//!
//! Quantities and prices derive from a running index, so two runs against
//! empty databases produce the same ledger.

use bizhome_core::{NewCategory, NewExpense, NewProduct, NewSale, UnitType};
use bizhome_db::{Database, DbConfig};
use chrono::{Duration, Local, NaiveDateTime};
use std::env;

/// (category, icon, products as (name, unit, purchase price))
const CATALOG: &[(&str, &str, &[(&str, UnitType, f64)])] = &[
    (
        "Granos",
        "grain",
        &[
            ("Arroz", UnitType::Libra, 0.55),
            ("Frijol Rojo", UnitType::Libra, 0.80),
            ("Maíz", UnitType::Libra, 0.35),
            ("Lenteja", UnitType::Libra, 0.90),
        ],
    ),
    (
        "Bebidas",
        "cup",
        &[
            ("Agua Purificada", UnitType::Litro, 0.40),
            ("Gaseosa 2L", UnitType::Unidad, 1.25),
            ("Jugo de Naranja", UnitType::Litro, 1.10),
        ],
    ),
    (
        "Lácteos",
        "milk",
        &[
            ("Leche Entera", UnitType::Litro, 0.95),
            ("Queso Fresco", UnitType::Libra, 2.40),
            ("Crema", UnitType::Unidad, 1.30),
        ],
    ),
    (
        "Limpieza",
        "spray",
        &[
            ("Detergente", UnitType::Kg, 1.80),
            ("Jabón de Baño", UnitType::Paquete, 2.10),
            ("Lejía", UnitType::Litro, 0.85),
        ],
    ),
    (
        "Snacks",
        "cookie",
        &[
            ("Galletas", UnitType::Paquete, 0.60),
            ("Papas Fritas", UnitType::Unidad, 0.45),
        ],
    ),
];

/// Household expense descriptions with a typical amount.
const EXPENSES: &[(&str, f64)] = &[
    ("Supermercado semanal", 85.0),
    ("Gasolina", 40.0),
    ("Recibo de luz", 55.0),
    ("Farmacia", 18.5),
    ("Cine con la familia", 25.0),
    ("Útiles escolares", 30.0),
    ("Internet", 35.0),
    ("Zapatos", 45.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 30;
    let mut db_path = String::from("./bizhome_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("BizHome Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of sales/expense history (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./bizhome_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 BizHome Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("History:  {} days", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    println!();
    println!("Creating catalog...");

    let mut product_ids = Vec::new();
    for (cat_idx, (category, icon, products)) in CATALOG.iter().enumerate() {
        let cat = db
            .categories()
            .insert(&NewCategory {
                name: category.to_string(),
                description: None,
                icon: Some(icon.to_string()),
            })
            .await?;

        for (prod_idx, (name, unit_type, cost)) in products.iter().enumerate() {
            let seed = cat_idx * 10 + prod_idx;
            let product = NewProduct {
                name: name.to_string(),
                category_id: cat.id,
                purchase_price: *cost,
                sale_price: markup(*cost, seed),
                unit_type: *unit_type,
                stock: 40.0 + (seed * 7 % 60) as f64,
                description: None,
                image_path: None,
                barcode: Some(format!("740{:010}", seed)),
            };

            match db.products().insert(&product).await {
                Ok(p) => product_ids.push((p.id, p.sale_price)),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }
    println!("  {} products in {} categories", product_ids.len(), CATALOG.len());
    if product_ids.is_empty() {
        println!("⚠ No products created, skipping history.");
        return Ok(());
    }

    // Ledger history
    println!();
    println!("Recording {} days of history...", days);

    let now = Local::now().naive_local();
    let start = std::time::Instant::now();
    let mut sales = 0;
    let mut expenses = 0;

    for day in (0..days).rev() {
        let seed = day as usize;
        let sales_today = 2 + seed % 5;

        for n in 0..sales_today {
            let (product_id, price) = product_ids[(seed * 3 + n * 5) % product_ids.len()];
            let sale = NewSale {
                product_id,
                quantity: 1.0 + ((seed + n) % 3) as f64,
                unit_price: price,
                date: at(now, day, 8 + n as i64),
            };

            match db.sales().record(&sale).await {
                Ok(_) => sales += 1,
                // Stock ran out for this product; keep going with the rest
                Err(e) => eprintln!("  Skipped sale: {}", e),
            }
        }

        if seed % 2 == 0 {
            let (description, amount) = EXPENSES[seed / 2 % EXPENSES.len()];
            db.expenses()
                .insert(&NewExpense {
                    description: description.to_string(),
                    amount: amount + (seed % 4) as f64 * 2.5,
                    date: at(now, day, 19),
                })
                .await?;
            expenses += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Recorded {} sales and {} expenses in {:?}", sales, expenses, elapsed);

    let retention = db.sales().accumulated_retention().await?;
    println!("  Accumulated retention: {:.2}", retention);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Sale price with a 20-60% markup, rounded to cents.
fn markup(cost: f64, seed: usize) -> f64 {
    let percent = 20.0 + (seed * 13 % 41) as f64;
    (cost * (1.0 + percent / 100.0) * 100.0).round() / 100.0
}

/// `days_ago` days before `now`, at `hour`:00.
fn at(now: NaiveDateTime, days_ago: i64, hour: i64) -> NaiveDateTime {
    let day = now.date() - Duration::days(days_ago);
    day.and_hms_opt(0, 0, 0).unwrap_or(now) + Duration::hours(hour)
}
