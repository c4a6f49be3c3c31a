//! `scancom` listener state machine.
//!
//! The listener owns the reading end of the transport for the whole connected
//! session. It reads the scanner output one byte at a time and turns it into
//! [`ScannerEvent`](crate::ScannerEvent)s.
//!
//! ```text
//!                    START
//!                      |
//!                      v
//!     no data    .-----------.   cancelled /
//!    .---------->|  Reading  |---read error-----.
//!    '-----------'-----------'                  |
//!                  |       ^                    v
//!               byte       |               .--------.
//!                  v       |  resume       |  Done  |--> END
//!             .-------------.              '--------'
//!             | Dispatching |
//!             '-------------'
//! ```

use std::fmt;

use log::info;

use super::accumulator::BarcodeBuffer;
use super::events::*;
use super::states::*;
use crate::bus::EventBus;
use crate::cancel::CancelToken;
use crate::listener::ListenerExit;
use crate::transport::ByteReader;

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// The listen loop. Create it with [`Listener::new`] and consume it with
/// [`Listener::run`], usually on a dedicated thread.
pub(crate) struct Listener {
    ctx: ListenerContext,
    sm: ListenerStates,
}
impl Listener {
    pub(crate) fn new(reader: ByteReader, bus: EventBus, cancel: CancelToken) -> Self {
        Listener {
            ctx: ListenerContext {
                reader,
                buffer: BarcodeBuffer::new(),
                bus,
                cancel,
            },
            // The listener naturally starts by waiting for data.
            sm: ListenerStates::Reading(ReadingState {}),
        }
    }

    /// The listener event loop runs until the `Done` state is reached and its
    /// `should_exit` flag is set, then returns why it stopped.
    pub(crate) fn run(mut self) -> ListenerExit {
        info!("=> Reading");
        loop {
            self.sm = self.sm.step(&mut self.ctx);
            if let ListenerStates::Done(done) = &self.sm {
                if done.should_exit {
                    return done.exit;
                }
            }
        }
    }

    /// Execute a single transition.
    #[cfg(test)]
    fn step(&mut self) {
        self.sm = self.sm.step(&mut self.ctx);
    }
}

/// Data shared by all states: the reading end of the transport, the barcode
/// accumulator, where to publish events and when to stop.
pub(crate) struct ListenerContext {
    pub reader: ByteReader,
    pub buffer: BarcodeBuffer,
    pub bus: EventBus,
    pub cancel: CancelToken,
}
impl fmt::Debug for ListenerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerContext")
            .field("buffer", &self.buffer)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// Wraps the states of the listener into a simple enum, which is used for
/// pattern matching during state transitions.
#[derive(Debug)]
enum ListenerStates {
    Reading(ReadingState),
    Dispatching(DispatchingState),
    Done(DoneState),
}
impl ListenerStates {
    /// The unit of work in the listener event loop. It runs the current state
    /// and decides the next transition from the event it returns. Transitions
    /// from events are implemented with the `From`/`Into` pattern, so an event
    /// can only lead to the states it has a conversion for.
    fn step(&mut self, ctx: &mut ListenerContext) -> Self {
        match self {
            ListenerStates::Reading(state) => {
                let event = state.run(ctx);
                match event {
                    Event::ByteReceived(ev) => ListenerStates::Dispatching(ev.into()),
                    Event::ResumeReading(ev) => ListenerStates::Reading(ev.into()),
                    Event::Stop(ev) => ListenerStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, state),
                }
            }
            ListenerStates::Dispatching(state) => {
                let event = state.run(ctx);
                match event {
                    Event::ResumeReading(ev) => ListenerStates::Reading(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, state),
                }
            }
            ListenerStates::Done(state) => {
                let event = state.run(ctx);
                match event {
                    Event::Exit(ev) => ListenerStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, state),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<ByteReceivedEvent> for DispatchingState {
    fn from(event: ByteReceivedEvent) -> DispatchingState {
        DispatchingState { byte: event.byte }
    }
}

impl From<ResumeReadingEvent> for ReadingState {
    fn from(_: ResumeReadingEvent) -> ReadingState {
        ReadingState {}
    }
}

impl From<StopEvent> for DoneState {
    fn from(event: StopEvent) -> DoneState {
        DoneState {
            exit: event.exit,
            should_exit: false,
        }
    }
}
impl From<ExitEvent> for DoneState {
    fn from(event: ExitEvent) -> DoneState {
        DoneState {
            exit: event.exit,
            should_exit: true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        io::{self, Read},
    };

    use super::*;
    use crate::bus::{ScannerEvent, Subscription};
    use crate::protocol::Response;

    /// What the scripted reader returns on each read call.
    enum Step {
        Byte(u8),
        Fail(io::ErrorKind),
    }

    /// Plays back a script, then keeps returning zero-length reads.
    struct ScriptedReader(VecDeque<Step>);
    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Step::Byte(byte)) => {
                    buf[0] = byte;
                    Ok(1)
                }
                Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted")),
                None => Ok(0),
            }
        }
    }

    fn scripted(steps: Vec<Step>) -> (Listener, Subscription, CancelToken) {
        let bus = EventBus::new();
        let events = bus.subscribe();
        let cancel = CancelToken::new();
        let listener = Listener::new(
            Box::new(ScriptedReader(steps.into())),
            bus,
            cancel.clone(),
        );
        (listener, events, cancel)
    }

    fn fed(input: &[u8]) -> (Listener, Subscription, CancelToken) {
        scripted(input.iter().copied().map(Step::Byte).collect())
    }

    /// Each byte takes one `Reading` and one `Dispatching` step.
    fn pump(listener: &mut Listener, bytes: usize) {
        for _ in 0..bytes * 2 {
            listener.step();
        }
    }

    #[test]
    fn terminated_line_yields_one_barcode() {
        let (mut listener, events, _) = fed(b"ABC123\r");
        pump(&mut listener, 7);
        assert_eq!(events.try_recv(), Some(ScannerEvent::Barcode("ABC123".into())));
        assert_eq!(events.try_recv(), None);
        assert!(listener.ctx.buffer.is_empty());
    }

    #[test]
    fn bare_terminator_yields_nothing() {
        let (mut listener, events, _) = fed(b"\r");
        pump(&mut listener, 1);
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn ack_leaves_buffer_untouched() {
        let (mut listener, events, _) = fed(b"AB\x06");
        pump(&mut listener, 3);
        assert_eq!(events.try_recv(), Some(ScannerEvent::Response(Response::Ack)));
        assert_eq!(events.try_recv(), None);
        assert_eq!(listener.ctx.buffer.as_bytes(), b"AB");
    }

    #[test]
    fn responses_interleaved_with_barcode() {
        let (mut listener, events, _) = fed(b"12\x1534\x05\r");
        pump(&mut listener, 7);
        assert_eq!(events.try_recv(), Some(ScannerEvent::Response(Response::Nak)));
        assert_eq!(events.try_recv(), Some(ScannerEvent::Response(Response::Enq)));
        assert_eq!(events.try_recv(), Some(ScannerEvent::Barcode("1234".into())));
    }

    #[test]
    fn consecutive_lines() {
        let (mut listener, events, _) = fed(b"A1\r\rB2\r");
        pump(&mut listener, 7);
        assert_eq!(events.try_recv(), Some(ScannerEvent::Barcode("A1".into())));
        assert_eq!(events.try_recv(), Some(ScannerEvent::Barcode("B2".into())));
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn no_data_keeps_reading() {
        let (mut listener, events, _) = scripted(vec![
            Step::Fail(io::ErrorKind::TimedOut),
            Step::Fail(io::ErrorKind::WouldBlock),
            Step::Fail(io::ErrorKind::Interrupted),
        ]);
        // three timeouts then zero-length reads
        for _ in 0..6 {
            listener.step();
            assert!(matches!(listener.sm, ListenerStates::Reading(_)));
        }
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn cancellation_discards_partial_barcode() {
        let (mut listener, events, cancel) = fed(b"PARTIAL\r");
        pump(&mut listener, 7);
        cancel.cancel();
        assert_eq!(listener.run(), ListenerExit::Cancelled);
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn done_state_clears_buffer() {
        let (mut listener, _events, cancel) = fed(b"XY");
        pump(&mut listener, 2);
        cancel.cancel();
        // Reading -> Done, then Done runs and cleans up
        listener.step();
        listener.step();
        assert!(listener.ctx.buffer.is_empty());
        assert!(matches!(
            listener.sm,
            ListenerStates::Done(DoneState {
                exit: ListenerExit::Cancelled,
                should_exit: true
            })
        ));
    }

    #[test]
    fn read_error_ends_the_loop() {
        let (listener, events, _) = scripted(vec![
            Step::Byte(b'9'),
            Step::Fail(io::ErrorKind::BrokenPipe),
            Step::Byte(b'\r'),
        ]);
        assert_eq!(
            listener.run(),
            ListenerExit::ReadFailed(io::ErrorKind::BrokenPipe)
        );
        assert_eq!(events.try_recv(), None);
    }
}
