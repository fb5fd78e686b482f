//! HTTP route modules

pub mod categories;
pub mod health;
pub mod products;
pub mod users;

use serde::Serialize;

/// Plain status body for updates and deletes
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl StatusResponse {
    pub fn success(message: &'static str) -> Self {
        Self {
            status: "success",
            message,
        }
    }
}
