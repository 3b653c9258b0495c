//! Infrastructure adapters for storage, resolution, config, and logging.

pub mod config;
pub mod logging;
pub mod resolver;
pub mod store;
pub mod workspace;
