use std::fmt;

use crate::error::BoxError;
use crate::record::{EventRecord, LogFormat};
use crate::sink::{EventSink, SinkKind};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type ConsoleWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Terminal stream a [`ConsoleSink`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Writes one line per record to stdout or stderr.
///
/// A single handle is held for the sink's lifetime so lines land in
/// delivery order and `flush` covers every earlier write.
pub struct ConsoleSink {
    stream: ConsoleStream,
    format: LogFormat,
    writer: Mutex<ConsoleWriter>,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream, format: LogFormat) -> Self {
        let writer: ConsoleWriter = match stream {
            ConsoleStream::Stdout => Box::new(tokio::io::stdout()),
            ConsoleStream::Stderr => Box::new(tokio::io::stderr()),
        };
        ConsoleSink {
            stream,
            format,
            writer: Mutex::new(writer),
        }
    }

    pub fn stdout(format: LogFormat) -> Self {
        Self::new(ConsoleStream::Stdout, format)
    }

    pub fn stderr(format: LogFormat) -> Self {
        Self::new(ConsoleStream::Stderr, format)
    }

    #[cfg(test)]
    fn with_writer(writer: ConsoleWriter, format: LogFormat) -> Self {
        ConsoleSink {
            stream: ConsoleStream::Stdout,
            format,
            writer: Mutex::new(writer),
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn render(&self, record: &EventRecord) -> Result<String, BoxError> {
        let mut line = match self.format {
            LogFormat::Text => record.to_console_text(),
            LogFormat::Json => record.to_json_line()?,
        };
        line.push('\n');
        Ok(line)
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("stream", &self.stream)
            .field("format", &self.format)
            .finish()
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    async fn send(&self, record: &EventRecord) -> Result<(), BoxError> {
        let line = self.render(record)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), BoxError> {
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InvocationContext;
    use crate::types::MainReportVersion;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_render_text_and_json() {
        let ctx = InvocationContext::new().shared();
        let record = EventRecord::from_event(&MainReportVersion::new(&ctx, "3.1")).unwrap();

        let text = ConsoleSink::stdout(LogFormat::Text).render(&record).unwrap();
        assert!(text.ends_with("Running with version 3.1\n"));

        let json = ConsoleSink::stderr(LogFormat::Json).render(&record).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(json.trim_end()).unwrap();
        assert_eq!(parsed["code"], "A001");
    }

    #[tokio::test]
    async fn test_console_sink_is_console_kind() {
        let sink = ConsoleSink::stdout(LogFormat::Text);
        assert_eq!(sink.kind(), SinkKind::Console);
        assert_eq!(ConsoleSink::stderr(LogFormat::Text).stream(), ConsoleStream::Stderr);
        assert!(sink.flush().await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lines_keep_delivery_order() {
        let ctx = InvocationContext::new().shared();
        let (writer, mut reader) = tokio::io::duplex(1 << 20);
        let sink = ConsoleSink::with_writer(Box::new(writer), LogFormat::Text);

        for i in 0..500 {
            let record =
                EventRecord::from_event(&MainReportVersion::new(&ctx, format!("SEQ{i:05}"))).unwrap();
            sink.send(&record).await.unwrap();
        }
        sink.flush().await.unwrap();
        drop(sink);

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        let versions: Vec<&str> = output
            .lines()
            .map(|line| line.rsplit(' ').next().unwrap())
            .collect();
        let expected: Vec<String> = (0..500).map(|i| format!("SEQ{i:05}")).collect();
        assert_eq!(versions, expected);
    }
}
