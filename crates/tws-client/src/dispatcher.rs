//! Run loop.
//!
//! Takes frames off the hand-off queue in order and hands them to the
//! [`Decoder`]. The loop keeps going while the client is connected or
//! frames are still queued, so everything the reader delivered before a
//! disconnect is still dispatched.
//!
//! Exits on:
//! - disconnected with an empty queue
//! - reader gone with an empty queue (transport ended)
//! - an oversized frame (reported as `BAD_LENGTH`)
//! - more than [`MAX_INTERRUPTS`] interrupts in one run

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use tws_core::{error_codes, Wrapper, NO_VALID_ID};
use tws_protocol::{FrameCodec, Inbound, ProtocolError};

use crate::decoder::Decoder;
use crate::transport::RawFrame;
use crate::types::Inbox;

/// Interrupts tolerated within one run; the next one ends it.
pub const MAX_INTERRUPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

enum Step {
    Frame(RawFrame),
    Interrupt,
    Idle,
    Closed,
}

pub(crate) struct Dispatcher {
    wrapper: Arc<dyn Wrapper>,
    codec: FrameCodec,
    decoder: Decoder,
    interrupts: u32,
    dispatched: u64,
}

impl Dispatcher {
    pub(crate) fn new(wrapper: Arc<dyn Wrapper>, server_version: i32) -> Self {
        Self {
            decoder: Decoder::new(wrapper.clone(), server_version),
            codec: FrameCodec::new(server_version),
            wrapper,
            interrupts: 0,
            dispatched: 0,
        }
    }

    fn report(&self, code: error_codes::ErrorCode, detail: &str) {
        let now = chrono::Utc::now().timestamp_millis();
        self.wrapper
            .error(NO_VALID_ID, now, code.code, &code.with_detail(detail), "");
    }

    pub(crate) fn process_frame(&mut self, frame: RawFrame) -> Flow {
        if frame.is_oversized() {
            warn!("Frame declares {} bytes, stopping", frame.declared_len);
            self.report(error_codes::BAD_LENGTH, &format!(" {}", frame.declared_len));
            return Flow::Stop;
        }

        let result = self.codec.decode(&frame.payload).and_then(|inbound| match inbound {
            Inbound::Legacy { message_id, fields } => self.decoder.interpret(message_id, &fields),
            Inbound::Protobuf { message_id, body } => {
                self.decoder.process_protobuf(message_id, &body)
            }
        });

        if let Err(e) = result {
            self.bad_message(&e);
        }

        self.dispatched += 1;
        self.wrapper.message_dispatched();
        Flow::Continue
    }

    fn bad_message(&self, e: &ProtocolError) {
        warn!("Failed to decode frame: {}", e);
        self.report(error_codes::BAD_MESSAGE, &format!(" - {}", e));
    }

    pub(crate) fn on_interrupt(&mut self) -> Flow {
        self.interrupts += 1;
        self.wrapper.interrupt_received(self.interrupts);
        if self.interrupts > MAX_INTERRUPTS {
            warn!("{} interrupts received, terminating run loop", self.interrupts);
            Flow::Stop
        } else {
            info!("Interrupt {} of {}", self.interrupts, MAX_INTERRUPTS);
            Flow::Continue
        }
    }

    pub(crate) fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

/// Drive `dispatcher` until one of the exit conditions holds.
///
/// `is_connected` is polled before every wait; the caller performs the
/// disconnect afterwards.
pub(crate) async fn run_loop(
    dispatcher: &mut Dispatcher,
    inbox: &mut Inbox,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
    poll: Duration,
    is_connected: impl Fn() -> bool,
) {
    loop {
        let step = if is_connected() {
            tokio::select! {
                biased;

                Some(()) = interrupts.recv() => Step::Interrupt,

                res = tokio::time::timeout(poll, inbox.recv()) => match res {
                    Ok(Some(frame)) => Step::Frame(frame),
                    Ok(None) => Step::Closed,
                    Err(_) => Step::Idle,
                },
            }
        } else if interrupts.try_recv().is_ok() {
            Step::Interrupt
        } else {
            match inbox.try_recv() {
                Ok(frame) => Step::Frame(frame),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Step::Closed,
            }
        };

        let flow = match step {
            Step::Frame(frame) => dispatcher.process_frame(frame),
            Step::Interrupt => dispatcher.on_interrupt(),
            Step::Idle => {
                dispatcher.wrapper.idle_tick();
                Flow::Continue
            }
            Step::Closed => {
                debug!("Queue drained, leaving run loop");
                Flow::Stop
            }
        };

        if flow == Flow::Stop {
            break;
        }
    }

    info!("Run loop finished after {} frames", dispatcher.dispatched());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bytes::Bytes;
    use tws_protocol::wire_types::MAX_MSG_LEN;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Wrapper for Recorder {
        fn error(&self, _req_id: i32, _t: i64, code: i32, _msg: &str, _json: &str) {
            self.events.lock().unwrap().push(format!("error {}", code));
        }
        fn next_valid_id(&self, order_id: i32) {
            self.events.lock().unwrap().push(format!("next_valid_id {}", order_id));
        }
        fn message_dispatched(&self) {
            self.events.lock().unwrap().push("dispatched".into());
        }
    }

    fn legacy(fields: &[&str]) -> RawFrame {
        let mut payload = Vec::new();
        for f in fields {
            payload.extend_from_slice(f.as_bytes());
            payload.push(0);
        }
        RawFrame::new(Bytes::from(payload))
    }

    #[test]
    fn decoded_frame_reaches_wrapper_then_hook() {
        let rec = Arc::new(Recorder::default());
        let mut d = Dispatcher::new(rec.clone(), 150);

        assert_eq!(d.process_frame(legacy(&["9", "1", "1000"])), Flow::Continue);
        assert_eq!(rec.events(), vec!["next_valid_id 1000", "dispatched"]);
    }

    #[test]
    fn oversized_frame_reports_bad_length_and_stops() {
        let rec = Arc::new(Recorder::default());
        let mut d = Dispatcher::new(rec.clone(), 150);

        assert_eq!(d.process_frame(RawFrame::oversized(MAX_MSG_LEN + 1)), Flow::Stop);
        assert_eq!(rec.events(), vec!["error 507"]);
    }

    #[test]
    fn malformed_frame_is_reported_and_loop_continues() {
        let rec = Arc::new(Recorder::default());
        let mut d = Dispatcher::new(rec.clone(), 150);

        assert_eq!(d.process_frame(legacy(&["9", "1", "not-a-number"])), Flow::Continue);
        assert_eq!(d.process_frame(legacy(&["x"])), Flow::Continue);
        assert_eq!(
            rec.events(),
            vec!["error 508", "dispatched", "error 508", "dispatched"]
        );
    }

    #[test]
    fn sixth_interrupt_stops() {
        let rec = Arc::new(Recorder::default());
        let mut d = Dispatcher::new(rec, 150);

        for _ in 0..MAX_INTERRUPTS {
            assert_eq!(d.on_interrupt(), Flow::Continue);
        }
        assert_eq!(d.on_interrupt(), Flow::Stop);
    }
}
