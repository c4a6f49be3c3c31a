//! In-memory transport used by the unit tests.
//!
//! [`MockTransport`] is handed to the driver while the test keeps the paired
//! [`MockLine`] to inject scanner output and inspect what was written.

use std::{
    collections::VecDeque,
    io::{self, Read},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use super::{ByteReader, Transport};
use crate::error::{Error, Result};

/// How long the mock reader blocks when no input is queued.
const POLL_INTERVAL: Duration = Duration::from_millis(2);

enum Inbound {
    Byte(u8),
    Fail(io::ErrorKind),
}

#[derive(Default)]
struct LineState {
    open: bool,
    open_count: usize,
    writes: Vec<Vec<u8>>,
    fail_writes: Option<io::ErrorKind>,
    fail_reader: bool,
    inbound: VecDeque<Inbound>,
}

pub(crate) struct MockTransport {
    line: Arc<Mutex<LineState>>,
}

/// Test side of a [`MockTransport`].
#[derive(Clone)]
pub(crate) struct MockLine {
    line: Arc<Mutex<LineState>>,
}

impl MockTransport {
    pub(crate) fn new() -> (MockTransport, MockLine) {
        let line = Arc::new(Mutex::new(LineState::default()));
        (
            MockTransport { line: line.clone() },
            MockLine { line },
        )
    }
}
impl Transport for MockTransport {
    fn open(&mut self) -> Result<()> {
        let mut line = self.line.lock().unwrap();
        line.open = true;
        line.open_count += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.line.lock().unwrap().open = false;
    }

    fn is_open(&self) -> bool {
        self.line.lock().unwrap().open
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut line = self.line.lock().unwrap();
        if let Some(kind) = line.fail_writes {
            return Err(io::Error::new(kind, "mock write failure"));
        }
        line.writes.push(bytes.to_vec());
        Ok(())
    }

    fn reader(&self) -> Result<ByteReader> {
        if self.line.lock().unwrap().fail_reader {
            return Err(Error::TransportOpen(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                "mock reader unavailable",
            )));
        }
        Ok(Box::new(MockReader {
            line: self.line.clone(),
        }))
    }
}

impl MockLine {
    /// Queue bytes as if the scanner had sent them.
    pub(crate) fn push(&self, bytes: &[u8]) {
        let mut line = self.line.lock().unwrap();
        line.inbound.extend(bytes.iter().copied().map(Inbound::Byte));
    }

    /// Make the next read fail once the queued bytes are consumed.
    pub(crate) fn fail_reads(&self, kind: io::ErrorKind) {
        self.line.lock().unwrap().inbound.push_back(Inbound::Fail(kind));
    }

    pub(crate) fn fail_writes(&self, kind: io::ErrorKind) {
        self.line.lock().unwrap().fail_writes = Some(kind);
    }

    /// Make handing out a reader fail.
    pub(crate) fn fail_reader(&self) {
        self.line.lock().unwrap().fail_reader = true;
    }

    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.line.lock().unwrap().writes.clone()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.line.lock().unwrap().writes.len()
    }

    pub(crate) fn open_count(&self) -> usize {
        self.line.lock().unwrap().open_count
    }

    pub(crate) fn is_open(&self) -> bool {
        self.line.lock().unwrap().open
    }

    /// True once the listener has consumed everything queued so far.
    pub(crate) fn drained(&self) -> bool {
        self.line.lock().unwrap().inbound.is_empty()
    }
}

struct MockReader {
    line: Arc<Mutex<LineState>>,
}
impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let next = self.line.lock().unwrap().inbound.pop_front();
        match next {
            Some(Inbound::Byte(byte)) => {
                buf[0] = byte;
                Ok(1)
            }
            Some(Inbound::Fail(kind)) => Err(io::Error::new(kind, "mock read failure")),
            None => {
                thread::sleep(POLL_INTERVAL);
                Err(io::Error::new(io::ErrorKind::TimedOut, "no data"))
            }
        }
    }
}
