//! Discrete notification events for the presentation collaborator.
//!
//! The core never renders; it appends structured notifications to a buffer
//! the host drains each frame. Dropping them unread is harmless.

use crate::ledger::Ticks;
use serde::{Deserialize, Serialize};

/// Coarse category tag, used by hosts to route or filter notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationCategory {
    Progression,
    Unlock,
    Craft,
    Brew,
    Mission,
    Offline,
}

/// One notification. `text` is presentation-ready but untranslated;
/// localization is the host's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub category: NotificationCategory,
    pub text: String,
    pub tick: Ticks,
}

/// Append-only buffer drained by the host.
#[derive(Debug, Clone, Default)]
pub struct NotificationBuffer {
    pending: Vec<Notification>,
}

impl NotificationBuffer {
    pub fn push(&mut self, category: NotificationCategory, text: impl Into<String>, tick: Ticks) {
        self.pending.push(Notification {
            category,
            text: text.into(),
            tick,
        });
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let mut buf = NotificationBuffer::default();
        buf.push(NotificationCategory::Craft, "forged", 10);
        buf.push(NotificationCategory::Mission, "returned", 12);
        let drained = buf.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text, "forged");
        assert_eq!(drained[1].tick, 12);
        assert!(buf.is_empty());
    }
}
