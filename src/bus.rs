//! Delivery of scanner events to any number of subscribers.
//!
//! Every [`Subscription`] owns the receiving end of its own channel; the
//! listener publishes each event to all live subscriptions. A subscription
//! that is dropped is forgotten on the next publish.
//!
//! **Example**
//! ```ignore
//! let events = driver.subscribe();
//! driver.activate_engine(&CancelToken::new())?;
//! match events.wait_for_response(Duration::from_secs(1)) {
//!     Some(response) => println!("{}: {}", response, response.describe()),
//!     None => println!("no response"),
//! }
//! ```

use std::{
    sync::{
        mpsc::{self, RecvTimeoutError, TryRecvError},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use log::trace;

use crate::protocol::Response;

/// Something the scanner said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    /// A line-protocol acknowledgement (ACK, NAK or ENQ).
    Response(Response),
    /// A complete, non-empty barcode line without its terminator.
    Barcode(String),
}

/// Publishing side, shared by the driver and the listener thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<ScannerEvent>>>>,
}
impl EventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        Subscription { rx }
    }

    /// Send the event to every live subscriber and forget the ones that have
    /// been dropped.
    pub(crate) fn publish(&self, event: ScannerEvent) {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!("published {:?} to {} subscriber(s)", event, subscribers.len());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::Sender<ScannerEvent>>> {
        // Senders stay usable even if a publisher panicked mid-update.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving side of the event stream. Obtained with
/// [`ScannerDriver::subscribe`](crate::ScannerDriver::subscribe).
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<ScannerEvent>,
}
impl Subscription {
    /// Block until the next event arrives or the driver goes away.
    pub fn recv(&self) -> Option<ScannerEvent> {
        self.rx.recv().ok()
    }

    /// Wait at most `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ScannerEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// The next event if one is already queued.
    pub fn try_recv(&self) -> Option<ScannerEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait at most `timeout` for the next ACK/NAK/ENQ. Barcodes received in
    /// the meantime are consumed and dropped, so use a dedicated subscription
    /// when barcodes matter.
    pub fn wait_for_response(&self, timeout: Duration) -> Option<Response> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.recv_timeout(remaining)? {
                ScannerEvent::Response(response) => return Some(response),
                ScannerEvent::Barcode(barcode) => {
                    trace!("skipping barcode {:?} while waiting for a response", barcode)
                }
            }
        }
    }

    /// Blocking iterator over events, ending when the driver is dropped.
    pub fn iter(&self) -> impl Iterator<Item = ScannerEvent> + '_ {
        self.rx.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn fan_out_to_all_subscribers() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();
        bus.publish(ScannerEvent::Barcode("4006381333931".into()));
        assert_eq!(
            first.try_recv(),
            Some(ScannerEvent::Barcode("4006381333931".into()))
        );
        assert_eq!(
            second.try_recv(),
            Some(ScannerEvent::Barcode("4006381333931".into()))
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);
        bus.publish(ScannerEvent::Response(Response::Ack));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Some(ScannerEvent::Response(Response::Ack)));
    }

    #[test]
    fn wait_for_response_skips_barcodes() {
        let bus = EventBus::new();
        let events = bus.subscribe();
        bus.publish(ScannerEvent::Barcode("ABC".into()));
        bus.publish(ScannerEvent::Response(Response::Nak));
        assert_eq!(
            events.wait_for_response(Duration::from_millis(100)),
            Some(Response::Nak)
        );
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn wait_for_response_times_out() {
        let bus = EventBus::new();
        let events = bus.subscribe();
        assert_eq!(events.wait_for_response(Duration::from_millis(10)), None);
    }

    #[test]
    fn recv_blocks_until_published() {
        let bus = EventBus::new();
        let events = bus.subscribe();
        let publisher = bus.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.publish(ScannerEvent::Response(Response::Enq));
        });
        assert_eq!(events.recv(), Some(ScannerEvent::Response(Response::Enq)));
        handle.join().unwrap();
    }

    #[test]
    fn recv_ends_when_the_bus_is_gone() {
        let bus = EventBus::new();
        let events = bus.subscribe();
        drop(bus);
        assert_eq!(events.recv(), None);
    }

    #[test]
    fn iter_drains_until_the_bus_is_gone() {
        let bus = EventBus::new();
        let events = bus.subscribe();
        bus.publish(ScannerEvent::Response(Response::Ack));
        bus.publish(ScannerEvent::Barcode("0123456789012".into()));
        drop(bus);
        assert_eq!(
            events.iter().collect::<Vec<_>>(),
            vec![
                ScannerEvent::Response(Response::Ack),
                ScannerEvent::Barcode("0123456789012".into()),
            ]
        );
    }
}
