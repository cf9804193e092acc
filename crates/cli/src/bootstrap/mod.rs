pub mod config;
pub mod logging;

pub use config::{load_config, log_loaded_config};
pub use logging::init_logging;
