//! Repository implementations, one per aggregate.
//!
//! Every repository follows the same shape: constructed with a pool
//! clone, methods return `DbResult<T>`, domain enums are stored as
//! strings and parsed on read, timestamps are set here.

pub mod content;
pub mod customer;
pub mod notification;
pub mod order;
pub mod product;
pub mod scenario;
pub mod seller;
pub mod shipping_config;

/// Generates a fresh UUID v4 entity id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
