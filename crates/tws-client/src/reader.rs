//! Background reader task.
//!
//! Reads frames in a loop and pushes them, untouched and in order, onto
//! the hand-off queue. It never decodes and never changes the connection
//! state: the run loop notices that the queue has closed.

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::transport::FrameReader;
use crate::types::InboxSender;

pub struct ReaderHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ReaderHandle {
    /// Stop the task and wait for it. Frames already queued stay queued.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.join.await {
            warn!("Reader task failed: {}", e);
        }
    }
}

pub fn spawn(reader: FrameReader, inbox: InboxSender) -> ReaderHandle {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(run(reader, inbox, shutdown_rx));
    ReaderHandle {
        shutdown: Some(shutdown_tx),
        join,
    }
}

async fn run(mut reader: FrameReader, inbox: InboxSender, mut shutdown: oneshot::Receiver<()>) {
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                frames += flush_buffered(&mut reader, &inbox);
                debug!("Reader stopping on request");
                break;
            }

            result = reader.read_frame() => match result {
                Ok(Some(frame)) => {
                    let oversized = frame.is_oversized();
                    if !inbox.push(frame) {
                        debug!("Run loop gone, reader stopping");
                        break;
                    }
                    frames += 1;
                    if oversized {
                        warn!("Oversized frame header, stream is out of sync");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Connection closed by peer");
                    break;
                }
                Err(e) => {
                    warn!("Read error: {}", e);
                    break;
                }
            }
        }
    }

    debug!("Reader exited after {} frames", frames);
}

/// Push every frame already complete in the read buffer. Stops after an
/// oversized marker, since nothing after it can be framed.
fn flush_buffered(reader: &mut FrameReader, inbox: &InboxSender) -> u64 {
    let mut pushed = 0;
    while let Some(frame) = reader.next_buffered() {
        let oversized = frame.is_oversized();
        if !inbox.push(frame) {
            break;
        }
        pushed += 1;
        if oversized {
            break;
        }
    }
    pushed
}
