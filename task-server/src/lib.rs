//! Task Server Library
//!
//! Configuration loading, logging setup and application wiring for the task
//! service binary. The HTTP surface lives in `task-api`, storage in `database`.

pub mod config;
pub mod setup;
pub mod telemetry;

pub use config::{Config, ConfigLoader, Overrides, Profile};
pub use setup::{
    create_connection_manager, ensure_database_directory, initialize_app, startup_exit_code, App,
    EXIT_INVALID_CONFIG, EXIT_SERVER_ERROR, EXIT_STORAGE_UNAVAILABLE,
};
pub use telemetry::{init_telemetry, log_startup_info, report_error};
