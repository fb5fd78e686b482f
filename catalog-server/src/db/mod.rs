//! Database layer - connection pool, schema bootstrap, and repositories
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits - no global connection state
//! - One transaction per logical write, acquired at operation start and
//!   committed or rolled back before return
//! - Reads are single set-based joins - no N+1 queries

pub mod pool;
pub mod repos;
pub mod schema;
pub mod sql;

pub use pool::create_pool;
pub use repos::{CategoryRepo, DbError, ProductRepo, UserRepo};
pub use schema::ensure_schema;
