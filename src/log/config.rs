// Log config

use std::path::PathBuf;

use crate::utils::{get_env_bool, get_env_string};

/// Logger configuration
#[derive(Clone)]
pub struct LogConfig {
    // Prefix for all the logs
    pub prefix: String,

    // File to append the log lines to (None = console only)
    pub file: Option<PathBuf>,

    // Error messages enabled?
    pub error_enabled: bool,

    // Warning messages enabled?
    pub warning_enabled: bool,

    // Info messages enabled?
    pub info_enabled: bool,

    // Success messages enabled?
    pub success_enabled: bool,

    // Debug messages enabled?
    pub debug_enabled: bool,

    // Trace messages enabled?
    pub trace_enabled: bool,
}

impl LogConfig {
    /// Loads the logger configuration from environment variables
    pub fn load_from_env() -> LogConfig {
        let log_file = get_env_string("LOG_FILE", "logs/app.log");

        LogConfig {
            prefix: "".to_string(),
            file: if log_file.is_empty() {
                None
            } else {
                Some(PathBuf::from(log_file))
            },
            error_enabled: get_env_bool("LOG_ERROR", true),
            warning_enabled: get_env_bool("LOG_WARNING", true),
            info_enabled: get_env_bool("LOG_INFO", true),
            success_enabled: get_env_bool("LOG_SUCCESS", true),
            debug_enabled: get_env_bool("LOG_DEBUG", false),
            trace_enabled: get_env_bool("LOG_TRACE", get_env_bool("LOG_DEBUG", false)),
        }
    }

    /// Creates a child configuration for a child logger
    ///
    /// The prefix parameter will be appended to the parent's prefix.
    /// The log file is shared with the parent.
    pub fn child_config(&self, prefix: &str) -> LogConfig {
        LogConfig {
            prefix: format!("{}{}", self.prefix, prefix),
            ..self.clone()
        }
    }
}
