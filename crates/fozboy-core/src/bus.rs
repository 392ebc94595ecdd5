use std::collections::VecDeque;

use crate::event::Event;

/// FIFO queue between the terminal, the release timer and `state::update`.
///
/// Commands run while draining may publish follow-up events (an image load
/// publishes `ImageLoaded` or `ImageFailed`), so the loop drains until
/// [`EventBus::has_pending`] is false before it draws again.
pub struct EventBus {
    queue: VecDeque<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Enqueue an event at the back of the queue.
    pub fn publish(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Remove and return all pending events, preserving insertion order.
    pub fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}
