//! Multicast channel for completed codes.
//!
//! [`CodeHub`] wraps a `tokio::sync::broadcast` channel. Every
//! [`CodeSubscription`] receives each code published after it subscribed;
//! nothing is replayed to late subscribers.
//!
//! # Backpressure
//!
//! The channel is bounded. A subscriber that falls more than
//! `channel_capacity` codes behind skips the oldest ones (logged as a
//! warning) instead of stalling the publisher, which runs on the input path.

use sw_core::DecodedCode;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;

/// Publishing side of the completed-code channel.
///
/// Cloning a hub yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct CodeHub {
    tx: broadcast::Sender<DecodedCode>,
}

impl CodeHub {
    /// Creates a hub whose subscribers may lag by at most `capacity` codes.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns a new live subscription.
    #[must_use]
    pub fn subscribe(&self) -> CodeSubscription {
        CodeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Publishes `code` to every current subscriber.
    ///
    /// Returns the number of subscribers the code was queued for. Publishing
    /// with no subscribers is not an error; the code is simply dropped.
    pub fn publish(&self, code: DecodedCode) -> usize {
        self.tx.send(code).unwrap_or(0)
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription to a [`CodeHub`].
///
/// The subscription ends only when every hub handle has been dropped.
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct CodeSubscription {
    rx: broadcast::Receiver<DecodedCode>,
}

impl CodeSubscription {
    /// Returns the next queued code without waiting.
    ///
    /// Returns `None` when nothing is queued or the hub is gone.
    pub fn try_next(&mut self) -> Option<DecodedCode> {
        loop {
            match self.rx.try_recv() {
                Ok(code) => return Some(code),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Code subscriber lagged; oldest codes skipped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the next code.
    ///
    /// Returns `None` once every hub handle has been dropped.
    pub async fn recv(&mut self) -> Option<DecodedCode> {
        loop {
            match self.rx.recv().await {
                Ok(code) => return Some(code),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Code subscriber lagged; oldest codes skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns `true` if codes are queued for this subscription.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(text: &str) -> DecodedCode {
        DecodedCode::new(text).unwrap()
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = CodeHub::new(4);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.publish(code("123456")), 0);
    }

    #[test]
    fn test_every_subscriber_receives() {
        let hub = CodeHub::new(4);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.publish(code("123456")), 2);

        assert_eq!(a.try_next(), Some(code("123456")));
        assert_eq!(b.try_next(), Some(code("123456")));
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let hub = CodeHub::new(4);
        let _early = hub.subscribe();
        hub.publish(code("111111"));

        let mut late = hub.subscribe();
        assert!(!late.has_pending());
        assert_eq!(late.try_next(), None);

        hub.publish(code("222222"));
        assert_eq!(late.try_next(), Some(code("222222")));
    }

    #[test]
    fn test_lagging_subscriber_skips_oldest() {
        let hub = CodeHub::new(2);
        let mut sub = hub.subscribe();
        for text in ["100000", "200000", "300000"] {
            hub.publish(code(text));
        }
        assert_eq!(sub.try_next(), Some(code("200000")));
        assert_eq!(sub.try_next(), Some(code("300000")));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_dropped_subscription_unsubscribes() {
        let hub = CodeHub::new(4);
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_recv_ends_when_hub_dropped() {
        let hub = CodeHub::new(4);
        let mut sub = hub.subscribe();
        hub.publish(code("987654"));
        drop(hub);

        assert_eq!(sub.recv().await, Some(code("987654")));
        assert_eq!(sub.recv().await, None);
    }
}
