use std::path::{Path, PathBuf};

use crate::error::BoxError;
use crate::record::{EventRecord, LogFormat};
use crate::sink::{EventSink, SinkKind};
use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends one line per record to a log file.
pub struct FileSink {
    path: PathBuf,
    format: LogFormat,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directories.
    pub async fn open(path: impl AsRef<Path>, format: LogFormat) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(FileSink {
            path,
            format,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    async fn send(&self, record: &EventRecord) -> Result<(), BoxError> {
        let mut line = match self.format {
            LogFormat::Text => record.to_file_text(),
            LogFormat::Json => record.to_json_line()?,
        };
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), BoxError> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InvocationContext;
    use crate::types::{MainReportVersion, NodeStart};
    use crate::node_info::NodeInfo;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_creates_directories_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");
        let ctx = InvocationContext::new().shared();

        let sink = FileSink::open(&path, LogFormat::Text).await.unwrap();
        for version in ["1.0", "1.1"] {
            let record = EventRecord::from_event(&MainReportVersion::new(&ctx, version)).unwrap();
            sink.send(&record).await.unwrap();
        }
        sink.flush().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Running with version 1.0"));
        assert!(lines[1].contains("[info ]"));
    }

    #[tokio::test]
    async fn test_json_lines_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let ctx = InvocationContext::with_invocation_id("inv-file").shared();

        let sink = FileSink::open(&path, LogFormat::Json).await.unwrap();
        let event = NodeStart::new(&ctx, "seed.raw", NodeInfo::new().with("unique_id", "seed.raw"));
        sink.send(&EventRecord::from_event(&event).unwrap()).await.unwrap();
        sink.flush().await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
        assert_eq!(parsed["invocation_id"], "inv-file");
        assert_eq!(parsed["node_info"]["unique_id"], "seed.raw");
    }

    #[tokio::test]
    async fn test_reopen_keeps_existing_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.log");
        let ctx = InvocationContext::new().shared();
        let record = EventRecord::from_event(&MainReportVersion::new(&ctx, "x")).unwrap();

        for _ in 0..2 {
            let sink = FileSink::open(&path, LogFormat::Text).await.unwrap();
            sink.send(&record).await.unwrap();
            sink.flush().await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
