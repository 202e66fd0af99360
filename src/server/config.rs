// Dashboard server configuration

use std::{path::PathBuf, time::Duration};

use crate::{
    log::Logger,
    utils::{get_env_string, get_env_u32, get_env_u64},
};

/// Dashboard server configuration
#[derive(Clone)]
pub struct DashboardConfiguration {
    /// Port of the HTTP control surface
    pub http_port: u32,

    /// Port of the viewer WebSocket server
    pub ws_port: u32,

    /// Bind address
    pub bind_address: String,

    /// Log file, written by the logger and tailed for the viewers
    pub log_file: Option<PathBuf>,

    /// Milliseconds between log file checks
    pub log_tail_interval_ms: u64,

    /// Milliseconds between metrics samples
    pub metrics_interval_ms: u64,

    /// Number of log lines sent to new viewers
    pub initial_log_lines: usize,

    /// Milliseconds to wait before marking the server as ready
    pub ready_delay_ms: u64,
}

impl DashboardConfiguration {
    pub fn load_from_env(logger: &Logger) -> Result<DashboardConfiguration, ()> {
        let http_port = get_env_u32("HTTP_PORT", 8001);

        if http_port == 0 || http_port > 65535 {
            logger.log_error(&format!("HTTP_PORT has an invalid value: {}", http_port));
            return Err(());
        }

        let ws_port = get_env_u32("WS_PORT", 8002);

        if ws_port == 0 || ws_port > 65535 {
            logger.log_error(&format!("WS_PORT has an invalid value: {}", ws_port));
            return Err(());
        }

        if ws_port == http_port {
            logger.log_error(&format!(
                "WS_PORT and HTTP_PORT must be different, both are set to {}",
                ws_port
            ));
            return Err(());
        }

        let bind_address = get_env_string("BIND_ADDRESS", "0.0.0.0");

        let log_file_str = get_env_string("LOG_FILE", "logs/app.log");
        let log_file = if log_file_str.is_empty() {
            logger.log_warning("LOG_FILE is empty. The viewers will not receive any log lines.");
            None
        } else {
            Some(PathBuf::from(log_file_str))
        };

        let log_tail_interval_ms = get_env_u64("LOG_TAIL_INTERVAL_MS", 1000);

        if log_tail_interval_ms == 0 {
            logger.log_error("LOG_TAIL_INTERVAL_MS must be greater than 0");
            return Err(());
        }

        let metrics_interval_ms = get_env_u64("METRICS_INTERVAL_MS", 3000);

        if metrics_interval_ms == 0 {
            logger.log_error("METRICS_INTERVAL_MS must be greater than 0");
            return Err(());
        }

        let initial_log_lines = get_env_u32("INITIAL_LOG_LINES", 100);
        let ready_delay_ms = get_env_u64("READY_DELAY_MS", 1000);

        Ok(DashboardConfiguration {
            http_port,
            ws_port,
            bind_address,
            log_file,
            log_tail_interval_ms,
            metrics_interval_ms,
            initial_log_lines: initial_log_lines as usize,
            ready_delay_ms,
        })
    }

    /// Gets the address for the HTTP control surface
    pub fn get_http_listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }

    /// Gets the address for the viewer WebSocket server
    pub fn get_ws_listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.ws_port)
    }

    /// Gets the time between log file checks
    pub fn get_log_tail_interval(&self) -> Duration {
        Duration::from_millis(self.log_tail_interval_ms)
    }

    /// Gets the time between metrics samples
    pub fn get_metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }

    /// Gets the delay before the server-ready transition
    pub fn get_ready_delay(&self) -> Duration {
        Duration::from_millis(self.ready_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    // Every case runs in the same test, since they share the process environment
    #[test]
    fn test_load_from_env() {
        let logger = Logger::new_disabled();

        for var in [
            "HTTP_PORT",
            "WS_PORT",
            "BIND_ADDRESS",
            "LOG_FILE",
            "LOG_TAIL_INTERVAL_MS",
            "METRICS_INTERVAL_MS",
            "INITIAL_LOG_LINES",
            "READY_DELAY_MS",
        ] {
            env::remove_var(var);
        }

        let config = DashboardConfiguration::load_from_env(&logger).unwrap();

        assert_eq!(config.get_http_listen_addr(), "0.0.0.0:8001");
        assert_eq!(config.get_ws_listen_addr(), "0.0.0.0:8002");
        assert_eq!(config.log_file, Some(PathBuf::from("logs/app.log")));
        assert_eq!(config.get_log_tail_interval(), Duration::from_secs(1));
        assert_eq!(config.get_metrics_interval(), Duration::from_secs(3));
        assert_eq!(config.initial_log_lines, 100);
        assert_eq!(config.get_ready_delay(), Duration::from_secs(1));

        env::set_var("WS_PORT", "70000");
        assert!(DashboardConfiguration::load_from_env(&logger).is_err());

        env::set_var("WS_PORT", "8001");
        assert!(DashboardConfiguration::load_from_env(&logger).is_err());

        env::set_var("WS_PORT", "9002");
        env::set_var("METRICS_INTERVAL_MS", "0");
        assert!(DashboardConfiguration::load_from_env(&logger).is_err());

        env::set_var("METRICS_INTERVAL_MS", "500");
        env::set_var("LOG_FILE", "");
        let config = DashboardConfiguration::load_from_env(&logger).unwrap();
        assert_eq!(config.get_ws_listen_addr(), "0.0.0.0:9002");
        assert_eq!(config.get_metrics_interval(), Duration::from_millis(500));
        assert!(config.log_file.is_none());

        env::remove_var("WS_PORT");
        env::remove_var("METRICS_INTERVAL_MS");
        env::remove_var("LOG_FILE");
    }
}
