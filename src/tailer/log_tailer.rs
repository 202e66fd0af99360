// Incremental reader of the log file

use std::{
    io::{ErrorKind, SeekFrom},
    path::{Path, PathBuf},
};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Reads the lines appended to a log file since the last poll
pub struct LogTailer {
    /// Path of the log file
    path: PathBuf,

    /// Byte offset up to which the file was already read
    last_read_offset: u64,
}

impl LogTailer {
    /// Creates new LogTailer, starting at the beginning of the file
    pub fn new(path: &Path) -> LogTailer {
        LogTailer {
            path: path.to_path_buf(),
            last_read_offset: 0,
        }
    }

    /// Gets the current read offset
    pub fn get_offset(&self) -> u64 {
        self.last_read_offset
    }

    /// Reads the new lines of the file
    ///
    /// If the file shrank (truncated or rotated), the offset goes
    /// back to 0 and the file is read again from the start.
    ///
    /// # Return value
    ///
    /// Returns the new non-empty lines, oldest first.
    /// A missing file yields no lines.
    pub async fn poll(&mut self) -> std::io::Result<Vec<String>> {
        let current_size = match tokio::fs::metadata(&self.path).await {
            Ok(m) => m.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e);
            }
        };

        if current_size < self.last_read_offset {
            self.last_read_offset = 0;
        }

        if current_size == self.last_read_offset {
            return Ok(Vec::new());
        }

        // The handle only lives for this poll
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.last_read_offset)).await?;

        let mut delta: Vec<u8> = Vec::new();
        let read = file
            .take(current_size - self.last_read_offset)
            .read_to_end(&mut delta)
            .await?;

        self.last_read_offset += read as u64;

        Ok(split_log_lines(&delta))
    }
}

/// Splits a chunk of the log file into its non-empty lines
pub fn split_log_lines(chunk: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(chunk)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn append(path: &Path, content: &str) {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn test_only_new_lines_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut tailer = LogTailer::new(&path);

        // Missing file
        assert!(tailer.poll().await.unwrap().is_empty());
        assert_eq!(tailer.get_offset(), 0);

        append(&path, "[t1] [INFO] first\n[t2] [INFO] second\n");

        assert_eq!(
            tailer.poll().await.unwrap(),
            vec!["[t1] [INFO] first".to_string(), "[t2] [INFO] second".to_string()]
        );

        // Nothing changed
        assert!(tailer.poll().await.unwrap().is_empty());

        append(&path, "\n[t3] [WARN] third\n\n");

        assert_eq!(tailer.poll().await.unwrap(), vec!["[t3] [WARN] third".to_string()]);
        assert_eq!(
            tailer.get_offset(),
            std::fs::metadata(&path).unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_truncated_file_is_read_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut tailer = LogTailer::new(&path);

        append(&path, "[t1] [INFO] a long line before the rotation\n");
        assert_eq!(tailer.poll().await.unwrap().len(), 1);

        std::fs::write(&path, "[t2] [INFO] rotated\n").unwrap();

        assert_eq!(tailer.poll().await.unwrap(), vec!["[t2] [INFO] rotated".to_string()]);
        assert_eq!(tailer.get_offset(), "[t2] [INFO] rotated\n".len() as u64);
    }

    #[test]
    fn test_split_log_lines() {
        assert_eq!(
            split_log_lines(b"a\r\n\r\nb\n  \nc"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(split_log_lines(b"\n\n").is_empty());
    }
}
