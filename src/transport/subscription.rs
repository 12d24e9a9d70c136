//! Time-change subscriptions.
//!
//! Each subscriber gets a one-slot channel. Publishing drops a value the
//! subscriber has not taken yet before sending the new one, so a slow
//! consumer only ever sees the latest time. Cancelling (or dropping) the
//! handle stops delivery; the transport forgets the slot on its next publish.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Consumer side, held by a view
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<f64>,
    active: Arc<AtomicBool>,
}

/// Producer side, held by the transport
#[derive(Debug)]
pub(crate) struct Publisher {
    sender: Sender<f64>,
    /// Clone of the subscriber's receiver, used to discard stale values
    stale: Receiver<f64>,
    active: Arc<AtomicBool>,
}

pub(crate) fn channel() -> (Publisher, Subscription) {
    let (sender, receiver) = bounded(1);
    let active = Arc::new(AtomicBool::new(true));
    let publisher = Publisher {
        sender,
        stale: receiver.clone(),
        active: Arc::clone(&active),
    };
    (publisher, Subscription { receiver, active })
}

impl Publisher {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Replace any pending value with `time`. Returns false once cancelled.
    pub(crate) fn publish(&self, time: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Ok(dropped) = self.stale.try_recv() {
            log::trace!("Coalesced pending frame at {:.3}s", dropped);
        }
        match self.sender.try_send(time) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("Subscriber slot still full, dropping frame at {:.3}s", time);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Subscription {
    /// Most recent time published since the last call, without blocking
    pub fn latest(&self) -> Option<f64> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(time) => latest = Some(time),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop observing. Pending values are discarded.
    pub fn cancel(&mut self) {
        self.active.store(false, Ordering::Release);
        while self.receiver.try_recv().is_ok() {}
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
