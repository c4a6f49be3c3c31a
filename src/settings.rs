//! Settings related to the scanner serial port and the driver.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values. The defaults match the scanner's
//! factory line configuration (9600 baud, 8N1, no flow control).
//!
//! The scanner only talks 9600 8N1. The line parameter setters (`baud_rate`,
//! `data_bits`, `flow_control`, `parity` and `stop_bits`) exist for bring-up
//! against serial adapters, loopbacks or a scanner whose configuration was
//! changed by other means. Normal use only sets the path, the read timeout
//! and the open retries.

use std::time::Duration;

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Serial device the scanner is usually attached to on a Raspberry Pi.
pub const DEFAULT_PATH: &str = "/dev/serial0";
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// =============================================================================
// Public Interface
// =============================================================================

/// Groups all settings related to the serial port used by `scancom` and acts as
/// a [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
/// for the settings.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The port name, usually the device path.
    pub path: String,
    /// The baud rate in symbols-per-second.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of signalling to use for controlling data transfer.
    pub flow_control: FlowControl,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bits to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// Maximum time a single read blocks before returning with no data. This
    /// bounds how long the listener takes to notice a cancellation.
    pub read_timeout: Duration,
    /// How many times opening the port is attempted before giving up.
    pub open_attempts: usize,
    /// Delay between two attempts to open the port.
    pub open_retry_delay: Duration,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder`.
    #[doc(hidden)]
    _private_use_builder: (),
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if not
/// explicitly set.
///
/// **Example**
///
/// ```
/// use scancom::SettingsBuilder;
///
/// let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
/// assert_eq!(settings.baud_rate, 9600);
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl SettingsBuilder {
    /// Start building the settings using the scanner's default line
    /// configuration on [`DEFAULT_PATH`].
    pub fn new() -> Self {
        SettingsBuilder {
            settings: Settings {
                path: DEFAULT_PATH.to_owned(),
                baud_rate: DEFAULT_BAUD_RATE,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                read_timeout: Duration::from_millis(100),
                open_attempts: 4,
                open_retry_delay: Duration::from_millis(1000),
                _private_use_builder: (),
            },
        }
    }

    /// Set the path to the serial port
    pub fn path<'a>(mut self, path: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.path = path.into().into_owned();
        self
    }

    /// Set the baud rate in symbols-per-second. Only for bring-up, the
    /// scanner expects [`DEFAULT_BAUD_RATE`].
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of signalling to use for controlling data transfer
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.settings.flow_control = flow_control;
        self
    }

    /// Set the type of parity to use for error checking
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bits to use to signal the end of a character
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.settings.read_timeout = read_timeout;
        self
    }

    /// Set how many times opening the port is tried. Zero is bumped to one.
    pub fn open_attempts(mut self, open_attempts: usize) -> Self {
        self.settings.open_attempts = open_attempts.max(1);
        self
    }

    pub fn open_retry_delay(mut self, open_retry_delay: Duration) -> Self {
        self.settings.open_retry_delay = open_retry_delay;
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}
impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn all_default() {
    let settings = SettingsBuilder::new().finalize();
    assert_eq!(
        settings,
        Settings {
            path: "/dev/serial0".into(),
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout: Duration::from_millis(100),
            open_attempts: 4,
            open_retry_delay: Duration::from_secs(1),
            _private_use_builder: (),
        }
    )
}

#[test]
fn builder_default_is_new() {
    assert_eq!(
        SettingsBuilder::default().finalize(),
        SettingsBuilder::new().finalize()
    );
}

#[test]
fn path() {
    let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
    assert_eq!(settings.path, "/dev/ttyUSB0");
    let settings = SettingsBuilder::new()
        .path(String::from("/dev/ttyAMA0"))
        .finalize();
    assert_eq!(settings.path, "/dev/ttyAMA0");
}

#[test]
fn path_keeps_the_scanner_line() {
    let settings = SettingsBuilder::new()
        .path("/dev/ttyUSB1")
        .read_timeout(Duration::from_millis(50))
        .finalize();
    assert_eq!(settings.baud_rate, DEFAULT_BAUD_RATE);
    assert_eq!(settings.data_bits, DataBits::Eight);
    assert_eq!(settings.parity, Parity::None);
    assert_eq!(settings.stop_bits, StopBits::One);
    assert_eq!(settings.flow_control, FlowControl::None);
}

#[test]
fn baud_rate() {
    let baud_rate = 115_200;
    let settings = SettingsBuilder::new().baud_rate(baud_rate).finalize();
    assert_eq!(settings.baud_rate, baud_rate);
}

#[test]
fn data_bits() {
    let data_bits = DataBits::Seven;
    let settings = SettingsBuilder::new().data_bits(data_bits).finalize();
    assert_eq!(settings.data_bits, data_bits);
}

#[test]
fn flow_control() {
    let flow_control = FlowControl::Hardware;
    let settings = SettingsBuilder::new().flow_control(flow_control).finalize();
    assert_eq!(settings.flow_control, flow_control);
}

#[test]
fn stop_bits() {
    let stop_bits = StopBits::Two;
    let settings = SettingsBuilder::new().stop_bits(stop_bits).finalize();
    assert_eq!(settings.stop_bits, stop_bits);
}

#[test]
fn parity() {
    let parity = Parity::Even;
    let settings = SettingsBuilder::new().parity(parity).finalize();
    assert_eq!(settings.parity, parity);
}

#[test]
fn read_timeout() {
    let settings = SettingsBuilder::new()
        .read_timeout(Duration::from_millis(20))
        .finalize();
    assert_eq!(settings.read_timeout, Duration::from_millis(20));
}

#[test]
fn open_retries() {
    let settings = SettingsBuilder::new()
        .open_attempts(0)
        .open_retry_delay(Duration::from_millis(250))
        .finalize();
    assert_eq!(settings.open_attempts, 1);
    assert_eq!(settings.open_retry_delay, Duration::from_millis(250));
}
