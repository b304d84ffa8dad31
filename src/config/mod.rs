use std::env;
use std::net::SocketAddr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/eventory".to_string()),
            bind_addr: env::var("BIND_ADDR")
                .ok()
                .and_then(|addr| addr.parse().ok())
                .unwrap_or_else(|| {
                    DEFAULT_BIND_ADDR
                        .parse()
                        .expect("default bind address is valid")
                }),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        }
    }
}
