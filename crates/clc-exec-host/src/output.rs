//! Progress output sinks

use std::sync::Mutex;

/// Sink for human-readable progress messages shown to the operator
pub trait UiOutput: Send + Sync {
    fn output(&self, message: &str);
}

/// Collects every message in memory
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: Mutex<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl UiOutput for BufferedOutput {
    fn output(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}
