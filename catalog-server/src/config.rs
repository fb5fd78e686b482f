//! Server configuration
//!
//! Resolved from CLI flags with environment fallback; `DATABASE_URL` is
//! the conventional source for the connection string (a `.env` file is
//! honored at startup).

use std::net::{AddrParseError, SocketAddr};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_parses() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            database_url: "postgres://localhost/catalog".into(),
        };
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
