//! Configuration loading, schema, and validation

pub mod loader;
pub mod schema;
pub mod validate;

pub use loader::ConfigLoader;
pub use schema::{AiServiceConfig, BackendConfig, Config, LoggingConfig, SpeechConfig};
