// Log module

mod config;
mod logger;

pub use config::*;
pub use logger::*;

#[macro_export]
macro_rules! log_error {
    // This marco logs an ERROR message, only if the ERROR level is enabled
    // The first argument must be the logger
    // The second argument must be the message to log, as a string
    ($logger:ident, $msg:expr) => {
        if $logger.config.error_enabled {
            $logger.log($crate::log::LogLevel::Error, &$msg);
        }
    };
}

#[macro_export]
macro_rules! log_warning {
    // This marco logs a WARNING message, only if the WARNING level is enabled
    ($logger:ident, $msg:expr) => {
        if $logger.config.warning_enabled {
            $logger.log($crate::log::LogLevel::Warning, &$msg);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    // This marco logs an INFO message, only if the INFO level is enabled
    ($logger:ident, $msg:expr) => {
        if $logger.config.info_enabled {
            $logger.log($crate::log::LogLevel::Info, &$msg);
        }
    };
}

#[macro_export]
macro_rules! log_success {
    // This marco logs a SUCCESS message, only if the SUCCESS level is enabled
    ($logger:ident, $msg:expr) => {
        if $logger.config.success_enabled {
            $logger.log($crate::log::LogLevel::Success, &$msg);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    // This marco logs a DEBUG message, only if the DEBUG level is enabled
    // The message is only formatted when the level is enabled
    ($logger:ident, $msg:expr) => {
        if $logger.config.debug_enabled {
            $logger.log($crate::log::LogLevel::Debug, &$msg);
        }
    };
}

#[macro_export]
macro_rules! log_trace {
    // This marco logs a TRACE message, only if the TRACE level is enabled
    ($logger:ident, $msg:expr) => {
        if $logger.config.trace_enabled {
            $logger.log($crate::log::LogLevel::Trace, &$msg);
        }
    };
}
