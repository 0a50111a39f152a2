// Copyright (c) 2024 Mike Tsao

use crossbeam::channel::{Receiver, Sender};

/// A convenience struct to bundle both halves of a bounded crossbeam channel
/// together. A producer that uses `try_send()` on a full channel drops the
/// message instead of blocking.
#[derive(Debug)]
pub struct BoundedCrossbeamChannel<T> {
    #[allow(missing_docs)]
    pub sender: Sender<T>,
    #[allow(missing_docs)]
    pub receiver: Receiver<T>,
}
impl<T> Default for BoundedCrossbeamChannel<T> {
    fn default() -> Self {
        Self::new_with(1)
    }
}
impl<T> BoundedCrossbeamChannel<T> {
    /// Creates a channel that holds at most `capacity` messages.
    pub fn new_with(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam::channel::bounded(capacity);
        Self { sender, receiver }
    }
}
