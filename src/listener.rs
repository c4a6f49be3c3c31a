//! The continuous read/dispatch loop.
//!
//! [`spawn`] starts the listener on its own thread. It keeps reading until its
//! cancel token fires or the transport fails, and reports which of the two
//! happened through the thread's join handle.

mod accumulator;
mod events;
mod state_machine;
mod states;

use std::{
    fmt, io,
    thread::{self, JoinHandle},
};

use crate::bus::EventBus;
use crate::cancel::CancelToken;
use crate::transport::ByteReader;

use state_machine::Listener;

/// Name of the listener thread, as shown in debuggers and panic messages.
pub(crate) const THREAD_NAME: &str = "scancom-listener";

/// Why the listen loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    /// The driver (or its owner) asked the listener to stop.
    Cancelled,
    /// Reading from the transport failed with an unrecoverable error.
    ReadFailed(io::ErrorKind),
}
impl fmt::Display for ListenerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerExit::Cancelled => f.write_str("cancelled"),
            ListenerExit::ReadFailed(kind) => write!(f, "read failed ({:?})", kind),
        }
    }
}

/// Start the listen loop on a dedicated thread.
pub(crate) fn spawn(
    reader: ByteReader,
    bus: EventBus,
    cancel: CancelToken,
) -> io::Result<JoinHandle<ListenerExit>> {
    thread::Builder::new()
        .name(THREAD_NAME.into())
        .spawn(move || Listener::new(reader, bus, cancel).run())
}
