// Logger

use std::{fs::OpenOptions, io::Write};

use super::config::LogConfig;
use chrono::{SecondsFormat, Utc};

/// Log level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Success,
    Debug,
    Trace,
}

impl LogLevel {
    /// Gets the tag written between brackets in every line
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// Logger
pub struct Logger {
    /// Configuration
    pub config: LogConfig,
}

impl Logger {
    // Creates new logger
    pub fn new(config: LogConfig) -> Logger {
        Logger { config }
    }

    // Creates new fully disabled logger
    pub fn new_disabled() -> Logger {
        Logger {
            config: LogConfig {
                prefix: "".to_string(),
                file: None,
                error_enabled: false,
                warning_enabled: false,
                info_enabled: false,
                success_enabled: false,
                debug_enabled: false,
                trace_enabled: false,
            },
        }
    }

    /// Makes child logger
    pub fn make_child_logger(&self, prefix: &str) -> Logger {
        Logger {
            config: self.config.child_config(prefix),
        }
    }

    /// Makes child logger writing to the console only
    pub fn make_console_child_logger(&self, prefix: &str) -> Logger {
        let mut config = self.config.child_config(prefix);
        config.file = None;

        Logger { config }
    }

    /// Checks if a level is enabled
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Error => self.config.error_enabled,
            LogLevel::Warning => self.config.warning_enabled,
            LogLevel::Info => self.config.info_enabled,
            LogLevel::Success => self.config.success_enabled,
            LogLevel::Debug => self.config.debug_enabled,
            LogLevel::Trace => self.config.trace_enabled,
        }
    }

    /// Logs a message with the given level
    ///
    /// The line goes to the console and, if configured, it is
    /// appended to the log file. A failure writing the file
    /// is reported on stderr and otherwise ignored.
    pub fn log(&self, level: LogLevel, line: &str) {
        if !self.is_enabled(level) {
            return;
        }

        let time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let full_line = format!("[{}] [{}] {}{}", time, level.tag(), self.config.prefix, line);

        if level == LogLevel::Error || self.config.trace_enabled {
            eprintln!("{}", full_line);
        } else {
            println!("{}", full_line);
        }

        if let Some(path) = &self.config.file {
            // One write per line, so concurrent appends do not interleave
            let entry = format!("{}\n", full_line);

            let res = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut f| f.write_all(entry.as_bytes()));

            if let Err(e) = res {
                eprintln!("Could not write to log file {}: {}", path.display(), e);
            }
        }
    }

    /// Logs error message
    pub fn log_error(&self, line: &str) {
        self.log(LogLevel::Error, line);
    }

    /// Logs warning message
    pub fn log_warning(&self, line: &str) {
        self.log(LogLevel::Warning, line);
    }

    /// Logs info message
    pub fn log_info(&self, line: &str) {
        self.log(LogLevel::Info, line);
    }

    /// Logs success message
    pub fn log_success(&self, line: &str) {
        self.log(LogLevel::Success, line);
    }

    /// Logs debug message
    pub fn log_debug(&self, line: &str) {
        self.log(LogLevel::Debug, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut config = Logger::new_disabled().config;
        config.file = Some(path.clone());
        config.info_enabled = true;
        config.warning_enabled = true;

        let logger = Logger::new(config).make_child_logger("[MEDIA] ");

        logger.log_info("Camera connected");
        logger.log_debug("Not written");
        logger.log_warning("Camera disconnected");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] [INFO] [MEDIA] Camera connected"));
        assert!(lines[1].ends_with("] [WARN] [MEDIA] Camera disconnected"));

        // Timestamp is ISO-8601 in UTC
        let ts_end = lines[0].find(']').unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&lines[0][1..ts_end]).is_ok());
    }

    #[test]
    fn test_log_file_missing_directory_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = Logger::new_disabled().config;
        config.file = Some(dir.path().join("missing").join("app.log"));
        config.error_enabled = true;

        Logger::new(config).log_error("still running");
    }

    #[test]
    fn test_console_child_logger_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut config = Logger::new_disabled().config;
        config.file = Some(path.clone());
        config.info_enabled = true;

        let logger = Logger::new(config);
        logger.make_console_child_logger("[TAILER] ").log_info("console only");
        logger.log_info("to file");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("console only"));
        assert!(content.contains("to file"));
    }

    #[test]
    fn test_concurrent_lines_are_not_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut config = Logger::new_disabled().config;
        config.file = Some(path.clone());
        config.info_enabled = true;

        let logger = std::sync::Arc::new(Logger::new(config));

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        logger.log_info(&format!("thread {} line {}", t, i));
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 8 * 500);

        for line in lines {
            assert_eq!(line.matches("] [INFO] ").count(), 1, "bad line: {}", line);
        }
    }
}
