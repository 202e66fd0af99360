// Recent lines of the log file

use std::path::Path;

use super::split_log_lines;

/// Reads the last lines of the log file
///
/// # Arguments
///
/// * `path` - Path of the log file
/// * `lines` - Max number of lines to return
///
/// # Return value
///
/// Returns up to `lines` non-empty lines, oldest first.
/// If the file does not exist or can not be read, returns an empty list.
pub async fn get_recent_logs(path: &Path, lines: usize) -> Vec<String> {
    let content = match tokio::fs::read(path).await {
        Ok(c) => c,
        Err(_) => {
            return Vec::new();
        }
    };

    let mut all_lines = split_log_lines(&content);

    if all_lines.len() > lines {
        all_lines.drain(..all_lines.len() - lines);
    }

    all_lines
}
