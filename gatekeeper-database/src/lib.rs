pub mod database;
pub mod impls;
pub mod model;
pub mod persist;

pub use database::{ConfigGuard, ConfigStore};
pub use model::server_config::{ResourceKind, ServerConfig};
