//! States for the `scancom` listener state machine.
//!
//! This module is private and restricted to the
//! [`listener`](crate::listener) scope.
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use std::io::{self, Read};

use log::{debug, error, info, trace};

use super::events::*;
use super::state_machine::ListenerContext;
use crate::bus::ScannerEvent;
use crate::listener::ListenerExit;
use crate::protocol::{classify, ControlByte};

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Trait adding the ability for a state to be `run` after a transition into it.
pub(crate) trait Runnable {
    /// A state implements this method so it can be `run` after the state
    /// machine transitions into it.
    ///
    /// During this call, the state does its work on the shared listener
    /// context and requests a transition by returning the appropriate `event`.
    /// The `event` is consumed to create the new `state` using the
    /// corresponding [`From`] trait implementation.
    fn run(&mut self, ctx: &mut ListenerContext) -> Event;
}

// Reading State ===============================================================

/// The idle state of the listener, suspended on a single-byte read.
///
///  * **[`ByteReceivedEvent`] => [`DispatchingState`]** when a byte arrived,
///  * **[`ResumeReadingEvent`] => [`ReadingState`]** when the read returned
///    without data (zero-length read or read timeout),
///  * **[`StopEvent`] => [`DoneState`]** on cancellation or an unrecoverable
///    read error.
#[derive(Debug)]
pub(crate) struct ReadingState {}
impl Runnable for ReadingState {
    fn run(&mut self, ctx: &mut ListenerContext) -> Event {
        if ctx.cancel.is_cancelled() {
            return stop(ListenerExit::Cancelled);
        }

        let mut buf = [0_u8; 1];
        match ctx.reader.read(&mut buf) {
            Ok(0) => Event::ResumeReading(ResumeReadingEvent {}),
            Ok(_) => {
                // A byte that shows up after cancellation is not dispatched.
                if ctx.cancel.is_cancelled() {
                    return stop(ListenerExit::Cancelled);
                }
                trace!("read {:#04x}", buf[0]);
                Event::ByteReceived(ByteReceivedEvent { byte: buf[0] })
            }
            Err(ref e) if is_no_data(e) => Event::ResumeReading(ResumeReadingEvent {}),
            Err(ref e) => {
                error!("read error: {}", e);
                stop(ListenerExit::ReadFailed(e.kind()))
            }
        }
    }
}

// Dispatching State ===========================================================

/// Routes one received byte: control codes become response events, the
/// terminator flushes the barcode buffer and anything else is buffered.
///
///  * **[`ResumeReadingEvent`] => [`ReadingState`]** always.
#[derive(Debug)]
pub(crate) struct DispatchingState {
    pub byte: u8,
}
impl Runnable for DispatchingState {
    fn run(&mut self, ctx: &mut ListenerContext) -> Event {
        match classify(self.byte) {
            ControlByte::Terminator => match ctx.buffer.flush() {
                Some(barcode) => {
                    debug!("barcode: {:?}", barcode);
                    ctx.bus.publish(ScannerEvent::Barcode(barcode));
                }
                None => trace!("empty line ignored"),
            },
            ControlByte::Data(byte) => ctx.buffer.push(byte),
            control => {
                if let Some(response) = control.response() {
                    debug!("response: {} ({})", response, response.describe());
                    ctx.bus.publish(ScannerEvent::Response(response));
                }
            }
        }
        Event::ResumeReading(ResumeReadingEvent {})
    }
}

// Done State ==================================================================

/// Reached when the listener terminates. Any unterminated barcode is thrown
/// away here and never published.
///
/// Like the other states, it runs once after the transition into it, then
/// fires the [`ExitEvent`] which sets `should_exit` and ends the event loop.
#[derive(Debug, Copy, Clone)]
pub(crate) struct DoneState {
    pub exit: ListenerExit,
    /// When `true` instructs the listener to leave its event loop.
    pub should_exit: bool,
}
impl Runnable for DoneState {
    fn run(&mut self, ctx: &mut ListenerContext) -> Event {
        info!("=> Done ({:?})", self.exit);
        let dropped = ctx.buffer.discard();
        if dropped > 0 {
            debug!("discarded {} byte(s) of unterminated barcode", dropped);
        }
        Event::Exit(ExitEvent { exit: self.exit })
    }
}

// =============================================================================
// Private stuff
// =============================================================================

fn stop(exit: ListenerExit) -> Event {
    Event::Stop(StopEvent { exit })
}

/// The transport had nothing for us within its read timeout.
fn is_no_data(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
