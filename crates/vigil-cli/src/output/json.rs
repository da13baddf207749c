//! JSON output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use serde::Serialize;
use vigil_core::{FrameResult, ResultOutput, SessionSummary};

/// A frame result tagged with the session it came from.
#[derive(Serialize)]
struct FrameLine<'a> {
    source: &'a str,
    #[serde(flatten)]
    result: &'a FrameResult,
}

/// JSON output adapter.
///
/// In line mode every record is written as it arrives. In array mode records
/// are buffered and written as one JSON array by [`JsonOutput::finish`].
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    buffer: Option<Mutex<Vec<serde_json::Value>>>,
    pretty: bool,
}

impl JsonOutput {
    /// Creates a JSON Lines output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a JSON Lines output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            buffer: None,
            pretty: false,
        }
    }

    /// Switches to array mode.
    #[must_use]
    pub fn into_array(mut self, pretty: bool) -> Self {
        self.buffer = Some(Mutex::new(Vec::new()));
        self.pretty = pretty;
        self
    }

    fn emit<T: Serialize>(&self, record: &T) -> Result<()> {
        if let Some(buffer) = &self.buffer {
            let value = serde_json::to_value(record)?;
            buffer
                .lock()
                .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
                .push(value);
            return Ok(());
        }

        let json = serde_json::to_string(record)?;
        self.write_line(&json)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }

    /// Writes the buffered records as a JSON array. No-op in line mode.
    pub fn finish(&self) -> Result<()> {
        let Some(buffer) = &self.buffer else {
            return Ok(());
        };
        let records = std::mem::take(
            &mut *buffer
                .lock()
                .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?,
        );
        let json = if self.pretty {
            serde_json::to_string_pretty(&records)?
        } else {
            serde_json::to_string(&records)?
        };
        self.write_line(&json)
    }
}

impl ResultOutput for JsonOutput {
    fn write_frame(&self, source: &str, result: &FrameResult) -> Result<()> {
        self.emit(&FrameLine { source, result })
    }

    fn write_summary(&self, summary: &SessionSummary) -> Result<()> {
        self.emit(summary)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use vigil_core::{LandmarkFrame, MonitorConfig, WellnessMonitor};

    use super::*;

    /// Writer that shares its bytes with the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn result(now: f64) -> FrameResult {
        WellnessMonitor::new(MonitorConfig::default(), 0.0)
            .update(&LandmarkFrame::new(640, 480), now)
    }

    #[test]
    fn test_lines_carry_source() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));

        output.write_frame("a.jsonl", &result(0.5)).unwrap();
        output.write_frame("b.jsonl", &result(1.0)).unwrap();

        let text = buf.contents();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["source"], "a.jsonl");
        assert_eq!(lines[1]["timestamp"], 1.0);
        assert!(lines[0].get("eye_calibration").is_some());
    }

    #[test]
    fn test_array_mode_buffers_until_finish() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone())).into_array(false);

        output.write_frame("a.jsonl", &result(0.0)).unwrap();
        output.write_frame("a.jsonl", &result(0.1)).unwrap();
        assert!(buf.contents().is_empty());

        output.finish().unwrap();
        let value: serde_json::Value = serde_json::from_str(&buf.contents()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_finish_is_noop_in_line_mode() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));
        output.finish().unwrap();
        assert!(buf.contents().is_empty());
    }
}
