//! Generation-counted slot for asynchronously produced previews.
//!
//! The host renders the selected object's preview off the event path. Every
//! selection or rotation change issues a new [`PreviewTicket`]; a result is
//! accepted only when it carries the latest ticket, so a slow render for an
//! earlier selection can never overwrite a newer one.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifies one preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewTicket(pub u64);

#[derive(Debug, Clone)]
pub struct PreviewSlot<T> {
    generation: u64,
    current: Option<T>,
}

impl<T> Default for PreviewSlot<T> {
    fn default() -> Self {
        Self { generation: 0, current: None }
    }
}

impl<T> PreviewSlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating every outstanding ticket.
    pub fn issue(&mut self) -> PreviewTicket {
        self.generation += 1;
        self.current = None;
        PreviewTicket(self.generation)
    }

    /// Drop the current preview without requesting another.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// Store `value` if `ticket` is still the latest. Returns whether it was kept.
    pub fn complete(&mut self, ticket: PreviewTicket, value: T) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, latest = self.generation, "discarding stale preview");
            return false;
        }
        self.current = Some(value);
        true
    }

    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Whether `ticket` is the one a completion would currently be accepted for.
    #[must_use]
    pub fn is_latest(&self, ticket: PreviewTicket) -> bool {
        ticket.0 == self.generation
    }
}
