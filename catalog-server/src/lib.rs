//! catalog-server: HTTP catalog service
//!
//! Manages users, categories, and products, where products relate to
//! categories through a many-to-many association. Product writes run as
//! single transactions covering the row, category resolution, and the
//! association set; reads reassemble the normalized rows into nested
//! product-with-categories views.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::ServerConfig;
