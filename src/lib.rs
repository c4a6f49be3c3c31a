//! Scancom drives a serial barcode scanner. It sends the scanner's vendor
//! commands (switch the scan engine on or off, change the capture mode, factory
//! reset) and, at the same time, decodes everything the scanner sends back
//! into typed events: line-protocol acknowledgements (ACK, NAK, ENQ) and
//! scanned barcodes.
//!
//! The crate is organized around a few small pieces:
//!
//! * The [`protocol`] codec: pure mappings from a [`CommandIntent`] to the
//!   bytes on the wire and from a received byte to a [`ControlByte`].
//! * A [`Transport`], the byte channel to the device. [`SerialTransport`]
//!   opens a serial port using [`Settings`] (9600 baud, 8N1 by default).
//! * The listener, a small state machine running on its own thread for the
//!   whole connected session. It reads one byte at a time, accumulates barcode
//!   text until a carriage return and publishes [`ScannerEvent`]s.
//! * The [`ScannerDriver`], which owns the transport, starts and stops the
//!   listener and sends commands.
//!
//! Like the rest of this family of tools, the listener is implemented as a
//! state machine in terms of **states** and **transitions** between them:
//!
//! * Can only be in one state at any time.
//! * Each state can have its own associated data if needed.
//! * Data shared between **all** states lives in a context next to the state.
//! * Transitions between states are triggered via typed **events** and only
//!   explicitly defined transitions are permitted.
//!
//! The implementation of state transitions leverages `rust`'s `From` and `Into`
//! pattern. Only transitions for which the `From` trait is implemented are
//! authorized and any other transition is detected at compile-time.
//!
//! **Example**
//! ```no_run
//! use std::time::Duration;
//! use scancom::{CancelToken, ScannerDriver, SettingsBuilder};
//!
//! # fn main() -> scancom::Result<()> {
//! let mut driver = ScannerDriver::serial(SettingsBuilder::new().finalize());
//! let events = driver.subscribe();
//! driver.connect()?;
//! driver.activate_engine(&CancelToken::new())?;
//! if let Some(response) = events.wait_for_response(Duration::from_secs(1)) {
//!     println!("scanner says {}", response);
//! }
//! driver.disconnect()?;
//! # Ok(())
//! # }
//! ```

mod bus;
mod cancel;
mod driver;
mod error;
mod listener;
pub mod protocol;
mod settings;
pub mod transport;

pub use bus::{ScannerEvent, Subscription};
pub use cancel::CancelToken;
pub use driver::{ConnectionState, ScannerDriver};
pub use error::{Error, Result};
pub use listener::ListenerExit;
pub use protocol::{classify, encode, CommandIntent, ControlByte, Response, ScannerMode};
pub use settings::{
    DataBits, FlowControl, Parity, Settings, SettingsBuilder, StopBits, DEFAULT_BAUD_RATE,
    DEFAULT_PATH,
};
pub use transport::{SerialTransport, Transport};
