//! Progress notifications for front ends.
//!
//! Each component takes a [`Notifier`] at construction. Sends never block and
//! never fail: a dropped receiver simply stops receiving.

use std::sync::mpsc;

/// Events surfaced to a consumer while crawling, loading or searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Number of top-level cache directories about to be loaded.
    DirCount(usize),
    /// Number of top-level cache directories loaded so far.
    DirProgress(usize),
    /// Free-text status line.
    Message(String),
    /// One step of a path search ("Looking at player: ...").
    Step(String),
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Notifier {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that drops every event.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    /// Create a notifier together with the receiving end.
    pub fn channel() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn message(&self, msg: impl Into<String>) {
        self.emit(ProgressEvent::Message(msg.into()));
    }

    pub fn step(&self, msg: impl Into<String>) {
        self.emit(ProgressEvent::Step(msg.into()));
    }
}
