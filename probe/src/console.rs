//! Line-oriented console output shared by probe workers.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Cloneable sink for human-readable report lines.
///
/// Each call writes one whole line under the lock, so lines from
/// concurrent workers never interleave mid-line.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Console writing into memory, plus a handle to read it back
    pub fn buffer() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        let console = Self::from_writer(captured.clone());
        (console, captured)
    }

    pub fn line(&self, text: impl AsRef<str>) {
        // a poisoned lock only means another worker panicked mid-write
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{}", text.as_ref());
        let _ = out.flush();
    }

    /// Write pre-rendered text that already ends in newlines
    pub fn block(&self, text: impl AsRef<str>) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = out.write_all(text.as_ref().as_bytes());
        let _ = out.flush();
    }
}

/// In-memory capture behind [`Console::buffer`]
#[derive(Clone, Default)]
pub struct CapturedOutput {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
