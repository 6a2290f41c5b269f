//! Receiver events and their subscribers

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::autotune::FrequencyPower;
use crate::message::DscMessage;

/// Subscriber queue depth
///
/// A subscriber which falls this far behind misses events
/// until it catches up.
pub const SUBSCRIBER_QUEUE_LEN: usize = 256;

/// Receiver event
///
/// Delivered to every subscriber obtained from
/// [`DscReceiver::subscribe()`](crate::DscReceiver::subscribe).
#[derive(Clone, Debug, PartialEq)]
pub enum DscEvent {
    /// A call was decoded
    Message(DscMessage),

    /// In-band spectrum of the most recent audio
    Spectrum(Vec<FrequencyPower>),

    /// Lifecycle change, such as start or stop
    Status(String),

    /// A recoverable error
    Error(String),
}

impl DscEvent {
    /// Decoded call, if this event carries one
    pub fn message(&self) -> Option<&DscMessage> {
        match self {
            DscEvent::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Fans events out to subscribers
///
/// Delivery never blocks. A full subscriber queue drops the
/// event for that subscriber only, and disconnected subscribers
/// are forgotten.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<DscEvent>>,
}

impl EventBus {
    /// Add a subscriber
    pub fn subscribe(&mut self) -> Receiver<DscEvent> {
        let (tx, rx) = crossbeam_channel::bounded(SUBSCRIBER_QUEUE_LEN);
        self.subscribers.push(tx);
        rx
    }

    /// True if anyone is listening
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    /// Deliver an event to every subscriber
    pub fn publish(&mut self, event: DscEvent) {
        self.subscribers
            .retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            });
    }
}
