//! FIFO playback queue.
//!
//! Insertion order is play order. The queue is owned exclusively by the
//! coordinator task; it is never shared across tasks, so no locking lives
//! here.

use crate::item::PlayableItem;
use std::collections::VecDeque;

/// Ordered sequence of items awaiting playback.
///
/// Unbounded, no deduplication, no priority. Dequeuing from an empty queue is
/// not an error; it simply yields `None`.
#[derive(Debug, Default, Clone)]
pub struct PlaybackQueue {
    items: VecDeque<PlayableItem>,
}

impl PlaybackQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the back.
    pub fn enqueue(&mut self, item: PlayableItem) {
        self.items.push_back(item);
    }

    /// Remove and return the front item, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<PlayableItem> {
        self.items.pop_front()
    }

    /// Inspect the front item without removing it.
    pub fn peek(&self) -> Option<&PlayableItem> {
        self.items.front()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clone out the pending items in play order.
    pub fn snapshot(&self) -> Vec<PlayableItem> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> PlayableItem {
        PlayableItem::new(title, "Show", format!("https://cdn.example.com/{title}.mp3"))
    }

    #[test]
    fn fifo_order_is_preserved() {
        let mut queue = PlaybackQueue::new();
        let items: Vec<_> = (0..10).map(|i| item(&format!("ep-{i}"))).collect();

        for it in &items {
            queue.enqueue(it.clone());
        }
        for expected in &items {
            assert_eq!(queue.dequeue().as_ref(), Some(expected));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn dequeue_on_empty_yields_none() {
        let mut queue = PlaybackQueue::new();
        assert_eq!(queue.dequeue(), None);
        // Still usable afterwards
        queue.enqueue(item("ep-1"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut queue = PlaybackQueue::new();
        let a = item("ep-a");
        queue.enqueue(a.clone());

        assert_eq!(queue.peek(), Some(&a));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(), Some(a));
    }

    #[test]
    fn snapshot_matches_play_order() {
        let mut queue = PlaybackQueue::new();
        let a = item("ep-a");
        let b = item("ep-b");
        queue.enqueue(a.clone());
        queue.enqueue(b.clone());

        assert_eq!(queue.snapshot(), vec![a, b]);
    }
}
