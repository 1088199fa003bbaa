//! Catalog - the relational store behind the marketplace.
//!
//! Creators, packs and samples live here. The pack+samples insert and the
//! pack delete are the two transactional writes the publication pipeline
//! relies on; slug uniqueness per creator is enforced at this layer as the
//! final arbiter between concurrent publications.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteCatalog;
pub use store::*;
pub use types::*;
