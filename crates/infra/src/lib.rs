//! Infrastructure layer: configuration, store sessions, repository backends.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{connect, Session, StoreProvider};
