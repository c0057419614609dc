//! # Seed Data Generator
//!
//! Populates the database with the shop's launch catalog and default
//! content for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p frantoio-db --bin seed
//!
//! # Specify database path
//! cargo run -p frantoio-db --bin seed -- --db ./data/frantoio.db
//! ```
//!
//! ## Generated Data
//! - The launch catalog (oil formats + gift box)
//! - Default email templates for order notifications
//! - Default shipping tariff document
//! - FAQ entries and legal page stubs

use chrono::Utc;
use std::env;
use uuid::Uuid;

use frantoio_core::shipping::ShippingConfig;
use frantoio_core::types::{Faq, Product, SubscriptionInterval};
use frantoio_db::{Database, DbConfig};

/// The launch catalog: (slug, name, price cents, weight grams, subscribable).
const CATALOG: &[(&str, &str, i64, i64, bool)] = &[
    ("olio-evo-250ml", "Olio EVO 250ml", 1050, 550, false),
    ("olio-evo-500ml", "Olio EVO 500ml", 1850, 900, true),
    ("olio-evo-750ml", "Olio EVO 750ml", 2590, 1300, true),
    ("latta-3l", "Latta 3L", 8900, 3400, true),
    ("latta-5l", "Latta 5L", 13900, 5600, false),
    ("confezione-regalo", "Confezione Regalo 2x500ml", 4200, 2100, false),
];

/// Default email templates: (key, subject, body).
const TEMPLATES: &[(&str, &str, &str)] = &[
    (
        "order_placed",
        "Ordine {{order_number}} ricevuto",
        "<p>Ciao {{name}},</p><p>abbiamo ricevuto il tuo ordine \
         <strong>{{order_number}}</strong> per un totale di {{total}}.</p>\
         <p>Ti avviseremo appena il pagamento sarà confermato.</p>",
    ),
    (
        "order_paid",
        "Ordine {{order_number}} confermato",
        "<p>Ciao {{name}},</p><p>il pagamento dell'ordine \
         <strong>{{order_number}}</strong> è stato confermato. Prepareremo \
         la spedizione nei prossimi giorni.</p>",
    ),
    (
        "order_shipped",
        "Ordine {{order_number}} spedito",
        "<p>Ciao {{name}},</p><p>il tuo ordine <strong>{{order_number}}</strong> \
         è stato affidato al corriere.</p>",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./frantoio_dev.db");

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
                println!("Frantoio Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./frantoio_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Frantoio Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let now = Utc::now();
    for (slug, name, price_cents, weight_grams, subscribable) in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
            description: Some("Olio extravergine di oliva, raccolta 2026.".to_string()),
            price_cents: *price_cents,
            compare_at_price_cents: None,
            weight_grams: *weight_grams,
            vat_rate_bps: 400,
            stock_quantity: 200,
            track_inventory: true,
            subscribable: *subscribable,
            subscription_interval: subscribable.then_some(SubscriptionInterval::Bimonthly),
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
    }
    println!("✓ Seeded {} products", CATALOG.len());

    // Email templates
    for (key, subject, body) in TEMPLATES {
        db.content().upsert_template(key, subject, body).await?;
    }
    println!("✓ Seeded {} email templates", TEMPLATES.len());

    // Shipping configuration
    db.shipping_config().save(&ShippingConfig::seed_default()).await?;
    println!("✓ Seeded shipping configuration");

    // FAQ
    let faqs = [
        ("Quanto dura una bottiglia aperta?", "Consigliamo di consumare l'olio entro 60 giorni dall'apertura, conservandolo al riparo da luce e calore."),
        ("Spedite all'estero?", "Spediamo in gran parte d'Europa. Il costo è calcolato al checkout in base a destinazione e peso."),
        ("Posso sospendere l'abbonamento?", "Sì, puoi sospendere o annullare l'abbonamento in qualsiasi momento scrivendoci."),
    ];
    for (position, (question, answer)) in faqs.iter().enumerate() {
        db.content()
            .insert_faq(&Faq {
                id: Uuid::new_v4().to_string(),
                question: question.to_string(),
                answer: answer.to_string(),
                position: position as i64,
                is_published: true,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ Seeded {} FAQ entries", faqs.len());

    // Legal page stubs
    for (slug, title) in [
        ("privacy", "Privacy Policy"),
        ("termini", "Termini e Condizioni"),
        ("cookie", "Cookie Policy"),
    ] {
        db.content()
            .upsert_page(slug, title, "<p>Contenuto in arrivo.</p>")
            .await?;
    }
    println!("✓ Seeded legal pages");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
