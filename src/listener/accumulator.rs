//! Accumulation of barcode payload bytes between line terminators.

use hexplay::HexViewBuilder;
use log::{debug, log_enabled, Level::Debug};

/// Barcode bytes received since the last terminator.
#[derive(Debug, Default)]
pub(crate) struct BarcodeBuffer {
    bytes: Vec<u8>,
}
impl BarcodeBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Take the completed line as text and clear the buffer. An empty buffer
    /// yields `None` so that a bare terminator never produces a barcode.
    pub(crate) fn flush(&mut self) -> Option<String> {
        if self.bytes.is_empty() {
            return None;
        }

        // Dump the received data in a hex table for debugging
        if log_enabled!(Debug) {
            let view = HexViewBuilder::new(&self.bytes)
                .address_offset(0)
                .row_width(16)
                .finish();
            debug!("barcode bytes:\n{}", view);
        }

        let barcode = String::from_utf8_lossy(&self.bytes).into_owned();
        self.bytes.clear();
        Some(barcode)
    }

    /// Drop an unterminated line. Returns how many bytes were thrown away.
    pub(crate) fn discard(&mut self) -> usize {
        let dropped = self.bytes.len();
        self.bytes.clear();
        dropped
    }

    #[cfg(test)]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_returns_text_and_clears() {
        let mut buffer = BarcodeBuffer::new();
        b"ABC123".iter().for_each(|b| buffer.push(*b));
        assert_eq!(buffer.flush().as_deref(), Some("ABC123"));
        assert!(buffer.is_empty());
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut buffer = BarcodeBuffer::new();
        buffer.push(b'A');
        buffer.push(0xFF);
        assert_eq!(buffer.flush().as_deref(), Some("A\u{FFFD}"));
    }

    #[test]
    fn discard_reports_dropped_bytes() {
        let mut buffer = BarcodeBuffer::new();
        buffer.push(b'9');
        buffer.push(b'7');
        assert_eq!(buffer.discard(), 2);
        assert_eq!(buffer.as_bytes(), b"");
    }
}
