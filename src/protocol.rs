//! The scanner's serial command protocol.
//!
//! Outgoing commands are short fixed byte sequences (see [`encode`]); incoming
//! data is a stream of single-byte control codes interleaved with barcode text
//! lines terminated by a carriage return (see [`classify`]).
//!
//! Both directions are pure mappings with no state, which keeps them usable
//! independently from any connection.
//!
//! **Example**
//! ```
//! use scancom::{classify, encode, CommandIntent, ControlByte, Response};
//!
//! assert_eq!(encode(CommandIntent::ActivateEngine), b"\x16T\x0D".to_vec());
//! assert_eq!(classify(0x06), ControlByte::Ack);
//! assert_eq!(classify(0x06).response(), Some(Response::Ack));
//! ```

mod command;
mod control;

pub use command::{encode, CommandIntent, ScannerMode, LINE_END};
pub use control::{classify, ControlByte, Response};
