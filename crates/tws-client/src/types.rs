//! Shared types for the client.
//!
//! This module defines:
//! - the hand-off queue between the reader task and the run loop
//! - `Session`: what the handshake negotiated for one connection

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::transport::RawFrame;

/// Negotiated parameters of one connection. Read-only once connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub server_version: i32,
    /// Opaque timestamp string from the handshake reply.
    pub connection_time: String,
    pub client_id: i32,
}

/// Number of frames pushed but not yet taken by the run loop.
#[derive(Debug, Clone, Default)]
pub struct QueueDepth(Arc<AtomicUsize>);

impl QueueDepth {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Reader side of the hand-off queue.
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: mpsc::UnboundedSender<RawFrame>,
    depth: QueueDepth,
}

impl InboxSender {
    /// Returns `false` once the run loop side is gone.
    pub fn push(&self, frame: RawFrame) -> bool {
        self.depth.0.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(frame).is_err() {
            self.depth.0.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }
}

/// Run-loop side of the hand-off queue, tagged with the version its frames
/// were negotiated under.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<RawFrame>,
    depth: QueueDepth,
    server_version: i32,
}

impl Inbox {
    /// Waits for the next frame; `None` once the reader is gone and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<RawFrame> {
        let frame = self.rx.recv().await;
        if frame.is_some() {
            self.depth.0.fetch_sub(1, Ordering::AcqRel);
        }
        frame
    }

    pub fn try_recv(&mut self) -> Result<RawFrame, TryRecvError> {
        let frame = self.rx.try_recv()?;
        self.depth.0.fetch_sub(1, Ordering::AcqRel);
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.depth.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    pub fn depth(&self) -> QueueDepth {
        self.depth.clone()
    }
}

/// Fresh FIFO for one connection.
pub fn inbox(server_version: i32) -> (InboxSender, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = QueueDepth::default();
    (
        InboxSender {
            tx,
            depth: depth.clone(),
        },
        Inbox {
            rx,
            depth,
            server_version,
        },
    )
}
