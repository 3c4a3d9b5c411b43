//! Configuration, file system paths, and logging setup for the Burg client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_API_BASE_URL, DEFAULT_DEFAULT_PRIVATE_PATH, DEFAULT_LOG_LEVEL,
    DEFAULT_PUBLIC_PATH, DEFAULT_SCAN_HOST,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
