pub mod env;
pub mod settings;

pub use env::ConfigError;
pub use settings::AppConfig;
