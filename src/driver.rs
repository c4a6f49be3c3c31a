//! The scanner driver: connection lifecycle and command sending.
//!
//! A [`ScannerDriver`] owns one [`Transport`]. While connected, a listener
//! thread reads the scanner output and publishes [`ScannerEvent`]s to every
//! [`Subscription`]; the owner sends commands from its own thread. Connecting
//! and disconnecting take `&mut self` and are therefore serialized by the
//! owner.
//!
//! **Example**
//! ```no_run
//! use std::time::Duration;
//! use scancom::{CancelToken, ScannerDriver, ScannerEvent, ScannerMode, SettingsBuilder};
//!
//! # fn main() -> scancom::Result<()> {
//! let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
//! let mut driver = ScannerDriver::serial(settings);
//! let events = driver.subscribe();
//!
//! driver.connect()?;
//! let cancel = CancelToken::new();
//! driver.set_mode(ScannerMode::Continuous, &cancel)?;
//! driver.activate_engine(&cancel)?;
//!
//! while let Some(event) = events.recv_timeout(Duration::from_secs(10)) {
//!     if let ScannerEvent::Barcode(barcode) = event {
//!         println!("{}", barcode);
//!     }
//! }
//! driver.disconnect()?;
//! # Ok(())
//! # }
//! ```

use std::thread::JoinHandle;

use log::{debug, error, info, warn};

use crate::bus::{EventBus, Subscription};
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::listener::{self, ListenerExit};
use crate::protocol::{encode, CommandIntent, ScannerMode, LINE_END};
use crate::transport::{SerialTransport, Transport};
use crate::Settings;

// =============================================================================
// Public Interface
// =============================================================================

/// Whether the driver currently holds an open session with the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Drives one barcode scanner over one transport.
///
/// Dropping the driver disconnects it.
pub struct ScannerDriver<T: Transport> {
    transport: T,
    state: ConnectionState,
    /// Last mode successfully applied during this session; `None` when unknown.
    mode: Option<ScannerMode>,
    bus: EventBus,
    listener: Option<ListenerHandle>,
}

impl ScannerDriver<SerialTransport> {
    /// A driver for a scanner on the serial port described by `settings`.
    pub fn serial(settings: Settings) -> Self {
        ScannerDriver::new(SerialTransport::new(settings))
    }
}

impl<T: Transport> ScannerDriver<T> {
    pub fn new(transport: T) -> Self {
        ScannerDriver {
            transport,
            state: ConnectionState::Disconnected,
            mode: None,
            bus: EventBus::new(),
            listener: None,
        }
    }

    /// Subscribe to the events published by the listener. Subscriptions
    /// survive disconnects and reconnects.
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The last mode applied with [`set_mode`](Self::set_mode) in this session,
    /// or `None` if it is unknown.
    pub fn mode(&self) -> Option<ScannerMode> {
        self.mode
    }

    /// `true` while the listen loop is alive. The loop can end on its own when
    /// the transport fails, in which case the driver stays connected until
    /// [`disconnect`](Self::disconnect) reports why.
    pub fn listener_running(&self) -> bool {
        self.listener
            .as_ref()
            .map_or(false, |listener| !listener.thread.is_finished())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -------------------------------------------------------------------------
    // Connection management
    // -------------------------------------------------------------------------

    /// Open the transport and start listening. Does nothing when already
    /// connected.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!("already connected");
            return Ok(());
        }

        let opened_here = !self.transport.is_open();
        if opened_here {
            self.transport.open()?;
        }
        self.mode = None;

        let reader = match self.transport.reader() {
            Ok(reader) => reader,
            Err(e) => {
                if opened_here {
                    self.transport.close();
                }
                return Err(e);
            }
        };
        let cancel = CancelToken::new();
        let thread = match listener::spawn(reader, self.bus.clone(), cancel.clone()) {
            Ok(thread) => thread,
            Err(e) => {
                if opened_here {
                    self.transport.close();
                }
                return Err(Error::ListenerSpawn(e));
            }
        };

        self.listener = Some(ListenerHandle { cancel, thread });
        self.state = ConnectionState::Connected;
        info!("=> Connected");
        Ok(())
    }

    /// Stop the listener and close the transport.
    ///
    /// Returns why the listen loop ended, or `None` when the driver was not
    /// connected. An unterminated barcode still being received is discarded.
    pub fn disconnect(&mut self) -> Result<Option<ListenerExit>> {
        if !self.is_connected() {
            debug!("already disconnected");
            return Ok(None);
        }

        // Close before joining so that a read still blocked in the transport
        // returns and the listener gets to see the cancellation.
        let listener = self.listener.take();
        if let Some(listener) = &listener {
            listener.cancel.cancel();
        }
        self.transport.close();
        let joined = listener.map(ListenerHandle::join);
        self.state = ConnectionState::Disconnected;
        self.mode = None;
        info!("=> Disconnected");

        match joined {
            Some(Ok(exit)) => {
                debug!("listener ended: {}", exit);
                Ok(Some(exit))
            }
            Some(Err(e)) => Err(e),
            None => Ok(Some(ListenerExit::Cancelled)),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Encode `intent` and write it, followed by a line feed, in a single
    /// write. Does not wait for the scanner's response; subscribe to the
    /// events to observe it.
    pub fn send(&mut self, intent: CommandIntent, cancel: &CancelToken) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut bytes = encode(intent);
        bytes.push(LINE_END);
        debug!("=> {} {:02x?}", intent, bytes);
        self.transport.write_all(&bytes).map_err(|e| {
            error!("failed to send `{}`: {}", intent, e);
            Error::TransportWrite(e)
        })
    }

    /// Switch the capture mode. Asking for the mode already applied in this
    /// session is a no-op and writes nothing.
    pub fn set_mode(&mut self, mode: ScannerMode, cancel: &CancelToken) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        if self.mode == Some(mode) {
            debug!("mode already {}", mode);
            return Ok(());
        }
        self.send(CommandIntent::SetMode(mode), cancel)?;
        self.mode = Some(mode);
        Ok(())
    }

    pub fn activate_engine(&mut self, cancel: &CancelToken) -> Result<()> {
        self.send(CommandIntent::ActivateEngine, cancel)
    }

    pub fn deactivate_engine(&mut self, cancel: &CancelToken) -> Result<()> {
        self.send(CommandIntent::DeactivateEngine, cancel)
    }

    /// Restore the scanner's factory configuration. The capture mode becomes
    /// unknown afterwards.
    pub fn factory_reset(&mut self, cancel: &CancelToken) -> Result<()> {
        self.send(CommandIntent::FactoryReset, cancel)?;
        self.mode = None;
        Ok(())
    }
}

impl<T: Transport> Drop for ScannerDriver<T> {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            warn!("error while disconnecting: {}", e);
        }
    }
}

// =============================================================================
// Private stuff
// =============================================================================

struct ListenerHandle {
    cancel: CancelToken,
    thread: JoinHandle<ListenerExit>,
}
impl ListenerHandle {
    /// Wait for a cancelled listener to finish. It notices the cancellation
    /// after its current read returns.
    fn join(self) -> Result<ListenerExit> {
        self.thread.join().map_err(|_| {
            error!("the listener thread panicked");
            Error::ListenerPanicked
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
