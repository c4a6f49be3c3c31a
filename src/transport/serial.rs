//! Serial port transport backed by the `serialport` crate.

use std::{fmt, io};

use log::{debug, info};
use serialport::{ClearBuffer, SerialPort, SerialPortType};

use super::{ByteReader, Transport};
use crate::error::Result;
use crate::Settings;

//==============================================================================
// Public Interface
//==============================================================================

/// A [`Transport`] over a physical (or virtual) serial port, configured from
/// [`Settings`].
///
/// The listener reads from a `try_clone` of the port, so reads and writes do
/// not need to be serialized.
pub struct SerialTransport {
    settings: Settings,
    port: Option<Box<dyn SerialPort>>,
}
impl SerialTransport {
    pub fn new(settings: Settings) -> Self {
        SerialTransport {
            settings,
            port: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
impl Transport for SerialTransport {
    fn open(&mut self) -> Result<()> {
        let port = open_and_setup_port(&self.settings)?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(port) = self.port.take() {
            info!(
                "Closing {}",
                port.name().unwrap_or_else(|| self.settings.path.clone())
            );
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        use std::io::Write;

        match self.port.as_mut() {
            Some(port) => {
                port.write_all(bytes)?;
                port.flush()
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "serial port is not open",
            )),
        }
    }

    fn reader(&self) -> Result<ByteReader> {
        match &self.port {
            Some(port) => {
                let reader: ByteReader = Box::new(port.try_clone()?);
                Ok(reader)
            }
            None => Err(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                "serial port is not open",
            )
            .into()),
        }
    }
}
impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port {
            Some(port) => debug_fmt_serialport!(port, f).finish(),
            None => f
                .debug_tuple("SerialTransport")
                .field(&self.settings.path)
                .finish(),
        }
    }
}

/// Enumerates the serial devices on the system. USB devices are described with
/// their manufacturer and product, as in `/dev/ttyUSB0: (FTDI / FT232R)`; the
/// device path is always the part before the first `:`.
pub fn available_ports() -> Vec<String> {
    let mut found = vec![];
    match serialport::available_ports() {
        Ok(ports) => {
            for p in ports {
                match p.port_type {
                    SerialPortType::UsbPort(info) => {
                        found.push(format!(
                            "{}: ({} / {})",
                            p.port_name,
                            info.manufacturer.as_deref().unwrap_or(""),
                            info.product.as_deref().unwrap_or("")
                        ));
                    }
                    // Built-in UARTs and virtual ports for testing
                    _ => found.push(p.port_name),
                }
            }
        }
        Err(ref e) => {
            info!("error: {}", e);
        }
    }
    found
}

//==============================================================================
// Private stuff
//==============================================================================

fn open_and_setup_port(settings: &Settings) -> Result<Box<dyn SerialPort>> {
    use retry::{delay, retry_with_index};

    let retries = settings.open_attempts.saturating_sub(1);
    let result = retry_with_index(
        delay::Fixed::from_millis(settings.open_retry_delay.as_millis() as u64).take(retries),
        |index| -> std::result::Result<Box<dyn SerialPort>, serialport::Error> {
            debug!("Trying to open {} ({})", settings.path, index);
            serialport::new(&settings.path, settings.baud_rate)
                .data_bits(settings.data_bits)
                .stop_bits(settings.stop_bits)
                .parity(settings.parity)
                .flow_control(settings.flow_control)
                .timeout(settings.read_timeout)
                .open()
        },
    );

    let mut port = match result {
        Ok(port) => port,
        Err(retry::Error::Operation {
            error,
            total_delay,
            tries,
        }) => {
            info!(
                "Failed to open the port after {:?} and {} tries: {}",
                total_delay, tries, error,
            );
            return Err(error.into());
        }
        Err(retry::Error::Internal(description)) => {
            info!("Internal retry error while opening port: {}", description);
            return Err(serialport::Error::new(
                serialport::ErrorKind::Unknown,
                "internal error while retrying to open the port",
            )
            .into());
        }
    };

    // Some drivers ignore the builder values on open, so apply them again and
    // read them back.
    port.set_baud_rate(settings.baud_rate)?;
    port.set_data_bits(settings.data_bits)?;
    port.set_stop_bits(settings.stop_bits)?;
    port.set_parity(settings.parity)?;
    port.set_flow_control(settings.flow_control)?;
    port.set_timeout(settings.read_timeout)?;

    info!(
        "Connected to {} at {} baud",
        port.name().unwrap_or_else(|| settings.path.clone()),
        port.baud_rate()?
    );
    debug!("data_bits    : {:#?}", port.data_bits()?);
    debug!("stop_bits    : {:#?}", port.stop_bits()?);
    debug!("parity       : {:#?}", port.parity()?);
    debug!("flow control : {:#?}", port.flow_control()?);

    if port.baud_rate()? != settings.baud_rate
        || port.data_bits()? != settings.data_bits
        || port.stop_bits()? != settings.stop_bits
        || port.parity()? != settings.parity
    {
        return Err(serialport::Error::new(
            serialport::ErrorKind::InvalidInput,
            format!(
                "{} did not accept the line settings {} {:?} {:?} {:?}",
                settings.path,
                settings.baud_rate,
                settings.data_bits,
                settings.parity,
                settings.stop_bits
            ),
        )
        .into());
    }

    // Drop whatever the scanner sent before we were listening.
    port.clear(ClearBuffer::All)?;

    Ok(port)
}
