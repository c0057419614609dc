//! # frantoio-db: Database Layer for Frantoio
//!
//! All persistence for the shop lives here: connection pool management,
//! embedded migrations, and one repository per aggregate.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         frantoio-db                                     │
//! │                                                                         │
//! │  Database ──► pool + migrations + repository accessors                 │
//! │                                                                         │
//! │  repository/                                                            │
//! │  ├── product          catalog CRUD, stock deltas                       │
//! │  ├── order            order + items (transactional), status flow       │
//! │  ├── customer         upsert-by-email, admin listing                   │
//! │  ├── seller           referral partners                                │
//! │  ├── content          FAQ, legal pages, email templates                │
//! │  ├── shipping_config  single JSON tariff document                      │
//! │  ├── scenario         scenarios + goals                                │
//! │  └── notification     outbox queue (polled by frantoio-notify)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Callers construct entities (ids, `created_at`); repositories
//!   refresh `updated_at` on every update
//! - Enum fields are stored as their `as_str()` form and parsed on read
//! - Nested documents (addresses, tariff tables) are JSON text columns

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
