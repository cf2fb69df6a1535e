//! Single-slot notification mailbox between the DMA interrupt and the signal task.
//!
//! The slot holds the tag of the most recently completed half buffer. Posting
//! never blocks: when the slot is still occupied the new tag is discarded, so
//! at most one notification is ever outstanding and the signal task always
//! processes the oldest unprocessed half.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use platform::BufferHalf;

/// Capacity of the mailbox. One slot is what makes the drop-on-full
/// behaviour coalesce notifications.
pub const MAILBOX_DEPTH: usize = 1;

/// ISR → signal task handoff of [`BufferHalf`] tags.
pub struct NotificationMailbox {
    slot: Channel<CriticalSectionRawMutex, BufferHalf, MAILBOX_DEPTH>,
}

impl NotificationMailbox {
    /// An empty mailbox.
    pub const fn new() -> Self {
        Self {
            slot: Channel::new(),
        }
    }

    /// Post `half` without blocking. Safe to call from interrupt context.
    ///
    /// Returns `false` if the slot was occupied and `half` was dropped.
    pub fn try_post(&self, half: BufferHalf) -> bool {
        self.slot.try_send(half).is_ok()
    }

    /// Wait for the next tag.
    pub async fn receive(&self) -> BufferHalf {
        self.slot.receive().await
    }

    /// Take the pending tag, if any.
    pub fn try_receive(&self) -> Option<BufferHalf> {
        self.slot.try_receive().ok()
    }

    /// `true` when a tag is waiting.
    pub fn is_pending(&self) -> bool {
        !self.slot.is_empty()
    }
}

impl Default for NotificationMailbox {
    fn default() -> Self {
        Self::new()
    }
}
