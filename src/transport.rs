//! The byte channel the scanner protocol runs over.
//!
//! The driver needs very little from a transport: an open/close lifecycle, a
//! way to write a command in one go, and an independent reader handle that a
//! background thread can block on while the owner keeps writing.
//!
//! A reader signals "no data yet" either by returning `Ok(0)` or by failing
//! with [`TimedOut`](std::io::ErrorKind::TimedOut),
//! [`WouldBlock`](std::io::ErrorKind::WouldBlock) or
//! [`Interrupted`](std::io::ErrorKind::Interrupted). Any other error is
//! treated as unrecoverable by the listener.

#[macro_use]
mod macros;

#[cfg(test)]
pub(crate) mod mock;
mod serial;

use std::io::{self, Read};

use crate::error::Result;

pub use serial::{available_ports, SerialTransport};

/// Reader handle handed to the listener thread.
pub type ByteReader = Box<dyn Read + Send>;

/// A byte-oriented, full-duplex channel to the scanner.
pub trait Transport: Send {
    /// Open the underlying channel. Called only when [`is_open`] is `false`.
    ///
    /// [`is_open`]: Transport::is_open
    fn open(&mut self) -> Result<()>;

    /// Close the channel. Closing an already closed transport does nothing.
    ///
    /// On disconnect the listener is cancelled, then the transport is closed,
    /// and only then is the listener joined. A read that is still blocked
    /// must return once `close` has run.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Write all the bytes as one operation.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Hand out a reader that can be used concurrently with
    /// [`write_all`](Transport::write_all). Only valid while open.
    ///
    /// Every read on the returned handle must come back within a bounded
    /// interval, with data, `Ok(0)` or one of the "no data yet" errors, or at
    /// the latest once [`close`](Transport::close) has been called. The
    /// listener only sees a cancellation between two reads.
    fn reader(&self) -> Result<ByteReader>;
}
