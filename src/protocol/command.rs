//! Command intents and their encoding into the scanner's byte sequences.

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Byte appended after every encoded command when it is written to the line.
pub const LINE_END: u8 = b'\n';

/// `SYN` `M` `CR`: the menu command prefix.
const MENU_PREFIX: &[u8] = b"\x16M\x0D";
const ACTIVATE_ENGINE: &[u8] = b"\x16T\x0D";
const DEACTIVATE_ENGINE: &[u8] = b"\x16U\x0D";

const MODE_DEFAULT: &[u8] = b"aosdft";
const MODE_CONTINUOUS: &[u8] = b"ppam3!";
const FACTORY_RESET: &[u8] = b"defovr!";

// ScannerMode =================================================================

/// Capture behavior of the scan engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerMode {
    /// Single-shot decoding on trigger.
    Default,
    /// Repeated automatic decoding.
    Continuous,
}
impl fmt::Display for ScannerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerMode::Default => f.write_str("default"),
            ScannerMode::Continuous => f.write_str("continuous"),
        }
    }
}
impl FromStr for ScannerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ScannerMode::Default),
            "continuous" => Ok(ScannerMode::Continuous),
            _ => Err(Error::InvalidMode(s.to_owned())),
        }
    }
}
/// Numeric mode values as used by host applications: `0` is
/// [`Default`](ScannerMode::Default), `1` is
/// [`Continuous`](ScannerMode::Continuous).
impl TryFrom<u8> for ScannerMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ScannerMode::Default),
            1 => Ok(ScannerMode::Continuous),
            _ => Err(Error::InvalidMode(value.to_string())),
        }
    }
}

// CommandIntent ===============================================================

/// A high-level request to the scanner. Each intent maps to exactly one fixed
/// byte sequence on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandIntent {
    SetMode(ScannerMode),
    ActivateEngine,
    DeactivateEngine,
    FactoryReset,
}
impl fmt::Display for CommandIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandIntent::SetMode(mode) => write!(f, "set mode {}", mode),
            CommandIntent::ActivateEngine => f.write_str("activate engine"),
            CommandIntent::DeactivateEngine => f.write_str("deactivate engine"),
            CommandIntent::FactoryReset => f.write_str("factory reset"),
        }
    }
}

/// Encode an intent into the bytes the scanner expects, without the trailing
/// [`LINE_END`].
pub fn encode(intent: CommandIntent) -> Vec<u8> {
    let menu = |payload: &[u8]| [MENU_PREFIX, payload].concat();
    match intent {
        CommandIntent::SetMode(ScannerMode::Default) => menu(MODE_DEFAULT),
        CommandIntent::SetMode(ScannerMode::Continuous) => menu(MODE_CONTINUOUS),
        CommandIntent::ActivateEngine => ACTIVATE_ENGINE.to_vec(),
        CommandIntent::DeactivateEngine => DEACTIVATE_ENGINE.to_vec(),
        CommandIntent::FactoryReset => menu(FACTORY_RESET),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_table() {
        let table: &[(CommandIntent, &[u8])] = &[
            (
                CommandIntent::SetMode(ScannerMode::Default),
                b"\x16M\x0Daosdft",
            ),
            (
                CommandIntent::SetMode(ScannerMode::Continuous),
                b"\x16M\x0Dppam3!",
            ),
            (CommandIntent::ActivateEngine, b"\x16T\x0D"),
            (CommandIntent::DeactivateEngine, b"\x16U\x0D"),
            (CommandIntent::FactoryReset, b"\x16M\x0Ddefovr!"),
        ];
        for (intent, expected) in table {
            assert_eq!(encode(*intent), expected.to_vec(), "{}", intent);
        }
    }

    #[test]
    fn encoding_has_no_line_end() {
        assert!(!encode(CommandIntent::FactoryReset).contains(&LINE_END));
    }

    #[test]
    fn mode_from_str() {
        assert_eq!(
            "default".parse::<ScannerMode>().unwrap(),
            ScannerMode::Default
        );
        assert_eq!(
            " Continuous ".parse::<ScannerMode>().unwrap(),
            ScannerMode::Continuous
        );
        match "burst".parse::<ScannerMode>() {
            Err(Error::InvalidMode(value)) => assert_eq!(value, "burst"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn mode_from_number() {
        assert_eq!(ScannerMode::try_from(0).unwrap(), ScannerMode::Default);
        assert_eq!(ScannerMode::try_from(1).unwrap(), ScannerMode::Continuous);
        assert!(matches!(
            ScannerMode::try_from(7),
            Err(Error::InvalidMode(_))
        ));
    }

    #[test]
    fn mode_display_round_trips() {
        for mode in [ScannerMode::Default, ScannerMode::Continuous] {
            assert_eq!(mode.to_string().parse::<ScannerMode>().unwrap(), mode);
        }
    }
}
