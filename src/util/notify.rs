//! Notification bus for dismissible user-facing messages.
//!
//! An explicit publish/subscribe channel passed by reference to whoever
//! needs it; subscriptions are handles that views release on unmount.
//! Nothing here is process-global.

use std::fmt;

/// Severity of a notice; drives the toast styling upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Handle identifying one subscriber; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Single-threaded fan-out of notices to live subscribers.
#[derive(Default)]
pub struct NoticeBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&Notice)>)>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; the returned id must be kept to unsubscribe.
    pub fn subscribe(&mut self, listener: impl FnMut(&Notice) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Deliver a notice to every live subscriber in subscription order.
    pub fn publish(&mut self, notice: &Notice) {
        for (_, listener) in &mut self.subscribers {
            listener(notice);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for NoticeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoticeBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
