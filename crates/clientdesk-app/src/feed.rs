// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::{self, Receiver, Sender};

/// Which piece of console state changed. Subscribers re-read the console
/// for the new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Records,
    Drafts,
    Selection,
    Audit,
    Filter,
    Loading,
    Notice,
    Confirmation,
    CreateForm,
}

#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: Vec<Sender<Change>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Change> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Sends `change` to every live subscriber and forgets the ones whose
    /// receiver was dropped.
    pub fn publish(&mut self, change: Change) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Change, ChangeFeed};

    #[test]
    fn every_subscriber_sees_each_change() {
        let mut feed = ChangeFeed::new();
        let first = feed.subscribe();
        let second = feed.subscribe();

        feed.publish(Change::Records);
        feed.publish(Change::Notice);

        assert_eq!(first.try_iter().collect::<Vec<_>>(), vec![Change::Records, Change::Notice]);
        assert_eq!(second.try_iter().collect::<Vec<_>>(), vec![Change::Records, Change::Notice]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut feed = ChangeFeed::new();
        let kept = feed.subscribe();
        drop(feed.subscribe());

        feed.publish(Change::Audit);
        assert_eq!(feed.subscriber_count(), 1);
        assert_eq!(kept.try_recv().ok(), Some(Change::Audit));
    }
}
