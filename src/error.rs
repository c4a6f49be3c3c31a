//! Errors reported by the `scancom` driver.
//!
//! Read failures and cancellation of the listener are not errors in this
//! sense: they terminate the listen loop and are reported back as a
//! [`ListenerExit`](crate::ListenerExit) when the driver is disconnected.

use std::io;

/// Everything that can go wrong while talking to the scanner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command was attempted while the driver is not connected. No I/O was
    /// performed.
    #[error("scanner is not connected")]
    NotConnected,

    /// The requested capture mode does not exist.
    #[error("invalid scanner mode `{0}` (expected `default` or `continuous`)")]
    InvalidMode(String),

    /// The caller's cancel token fired before the command was written.
    #[error("operation cancelled")]
    Cancelled,

    /// Opening, configuring or cloning the serial port failed.
    #[error("failed to open the transport: {0}")]
    TransportOpen(#[from] serialport::Error),

    /// Writing a command to the transport failed.
    #[error("failed to write to the transport: {0}")]
    TransportWrite(#[source] io::Error),

    /// The operating system refused to start the listener thread.
    #[error("failed to spawn the listener thread: {0}")]
    ListenerSpawn(#[source] io::Error),

    /// The listener thread panicked and could not be joined cleanly.
    #[error("the listener thread panicked")]
    ListenerPanicked,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
