//! Events for the `scancom` listener state machine.
//!
//! This module is private and restricted to the
//! [`listener`](crate::listener) scope.
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use crate::listener::ListenerExit;

// ByteReceivedEvent ===========================================================

/// Event fired when the reading state got one byte from the transport. It
/// triggers a transition to the dispatching state, which takes the byte along.
#[derive(Debug)]
pub(crate) struct ByteReceivedEvent {
    pub byte: u8,
}

// ResumeReadingEvent ==========================================================

/// Event fired to go back to (or stay in) the reading state.
///
/// This event can happen under one of the following circumstances:
///
///  1. After a byte was dispatched.
///  2. While reading, when the transport had no data for us within its read
///     timeout.
#[derive(Debug)]
pub(crate) struct ResumeReadingEvent {}

// StopEvent ===================================================================

/// Event fired when the listener must terminate, either because it was
/// cancelled or because the transport failed. It triggers a transition to the
/// `Done` state.
#[derive(Debug)]
pub(crate) struct StopEvent {
    pub exit: ListenerExit,
}

// ExitEvent ===================================================================

/// The last event of the listener state machine, fired by the `Done` state
/// once it has cleaned up. The event loop terminates and hands the exit reason
/// back to whoever spawned the listener.
#[derive(Debug)]
pub(crate) struct ExitEvent {
    pub exit: ListenerExit,
}

// Events enum ==================================================================

/// Events that can be triggered within the listener state machine.
#[derive(Debug)]
pub(crate) enum Event {
    ByteReceived(ByteReceivedEvent),
    ResumeReading(ResumeReadingEvent),
    Stop(StopEvent),
    Exit(ExitEvent),
}
