//! Classification of bytes received from the scanner.

use std::fmt;

const ACK: u8 = 0x06;
const NAK: u8 = 0x15;
const ENQ: u8 = 0x05;
const CR: u8 = 0x0D;

/// What a single received byte means to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlByte {
    /// `0x06`, the last command was accepted.
    Ack,
    /// `0x15`, bad command or out of range command parameters.
    Nak,
    /// `0x05`, bad command.
    Enq,
    /// `0x0D`, end of a barcode line.
    Terminator,
    /// Any other byte: barcode payload.
    Data(u8),
}
impl ControlByte {
    /// The acknowledgement carried by this byte, if any.
    pub fn response(self) -> Option<Response> {
        match self {
            ControlByte::Ack => Some(Response::Ack),
            ControlByte::Nak => Some(Response::Nak),
            ControlByte::Enq => Some(Response::Enq),
            ControlByte::Terminator | ControlByte::Data(_) => None,
        }
    }
}

/// Classify one received byte. Total over all byte values.
pub fn classify(byte: u8) -> ControlByte {
    match byte {
        ACK => ControlByte::Ack,
        NAK => ControlByte::Nak,
        ENQ => ControlByte::Enq,
        CR => ControlByte::Terminator,
        other => ControlByte::Data(other),
    }
}

/// Line-protocol acknowledgement returned by the scanner after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    Ack,
    Nak,
    Enq,
}
impl Response {
    /// Human readable meaning of the response.
    pub fn describe(self) -> &'static str {
        match self {
            Response::Ack => "command accepted",
            Response::Nak => "bad command, or out of range command parameters",
            Response::Enq => "bad command",
        }
    }

    pub fn is_ack(self) -> bool {
        self == Response::Ack
    }
}
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ack => f.write_str("ACK"),
            Response::Nak => f.write_str("NAK"),
            Response::Enq => f.write_str("ENQ"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_values() {
        assert_eq!(classify(0x06), ControlByte::Ack);
        assert_eq!(classify(0x15), ControlByte::Nak);
        assert_eq!(classify(0x05), ControlByte::Enq);
        assert_eq!(classify(0x0D), ControlByte::Terminator);
    }

    #[test]
    fn classify_is_total() {
        let mut non_data = vec![];
        for byte in 0..=u8::MAX {
            match classify(byte) {
                ControlByte::Data(value) => assert_eq!(value, byte),
                _ => non_data.push(byte),
            }
        }
        assert_eq!(non_data, vec![0x05, 0x06, 0x0D, 0x15]);
    }

    #[test]
    fn line_feed_is_data() {
        assert_eq!(classify(b'\n'), ControlByte::Data(b'\n'));
    }

    #[test]
    fn responses() {
        assert_eq!(classify(0x15).response(), Some(Response::Nak));
        assert_eq!(classify(0x0D).response(), None);
        assert_eq!(classify(b'A').response(), None);
        assert_eq!(Response::Enq.to_string(), "ENQ");
        assert!(Response::Ack.is_ack());
        assert!(!Response::Nak.is_ack());
    }
}
