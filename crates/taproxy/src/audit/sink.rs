//! Append-only audit log sink shared by all in-flight requests.

use std::io;
use std::path::Path;

use chrono::Local;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::error;

pub const REQUEST_LABEL: &str = "Request";
pub const RESPONSE_LABEL: &str = "Response";

/// Serialized writer over the audit log file.
///
/// Each dump becomes one contiguous record: a timestamped label line, the
/// raw dump bytes, and a blank-line separator. Records written by
/// concurrent request handlers never interleave mid-record.
pub struct AuditLog {
    writer: Mutex<File>,
}

impl AuditLog {
    /// Open (or create) the log file in append mode.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            writer: Mutex::new(file),
        })
    }

    /// Append one labeled dump to the log.
    ///
    /// Fail-open: a sink error is reported through tracing and otherwise
    /// swallowed, so audit failures never affect traffic.
    pub async fn record(&self, label: &str, dump: &[u8]) {
        if let Err(e) = self.write_record(label, dump).await {
            error!("Failed to write {} record to audit log: {}", label, e);
        }
    }

    async fn write_record(&self, label: &str, dump: &[u8]) -> io::Result<()> {
        let mut record = Vec::with_capacity(dump.len() + 64);
        let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S");
        record.extend_from_slice(format!("{timestamp} {label}:\n").as_bytes());
        record.extend_from_slice(dump);
        record.extend_from_slice(b"\n\n");

        // One write_all under the lock; the whole record lands or none of it.
        let mut writer = self.writer.lock().await;
        writer.write_all(&record).await?;
        writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_is_labeled_and_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.log");
        let log = AuditLog::open(&path).await.unwrap();

        log.record(REQUEST_LABEL, b"GET /ping HTTP/1.1\r\n\r\n").await;
        log.record(RESPONSE_LABEL, b"HTTP/1.1 200 OK\r\n\r\nhi").await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Request:\nGET /ping HTTP/1.1\r\n\r\n\n\n"));
        assert!(contents.contains("Response:\nHTTP/1.1 200 OK\r\n\r\nhi\n\n"));
        assert!(contents.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn test_record_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.log");
        std::fs::write(&path, "existing\n").unwrap();

        let log = AuditLog::open(&path).await.unwrap();
        log.record(REQUEST_LABEL, b"dump").await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("existing\n"));
        assert!(contents.contains("Request:\ndump"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_records_stay_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.log");
        let log = Arc::new(AuditLog::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                let dump = format!("writer-{i};").repeat(512);
                for _ in 0..4 {
                    log.record(REQUEST_LABEL, dump.as_bytes()).await;
                }
                dump
            }));
        }

        let mut dumps = Vec::new();
        for handle in handles {
            dumps.push(handle.await.unwrap());
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        for dump in dumps {
            // An interleaved write would split the dump across records.
            assert_eq!(contents.matches(&dump).count(), 4);
        }
    }
}
