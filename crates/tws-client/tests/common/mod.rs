// crates/tws-client/tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use tws_client::{Client, ClientConfig};
use tws_core::{Contract, Execution, OrderStatus, Wrapper};
use tws_protocol::field_codec::read_fields;

pub const CONNECTION_TIME: &str = "20261017 09:30:00 EST";

// ============================================================================
// Recording wrapper
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ConnectAck,
    ConnectionClosed,
    Error { req_id: i32, code: i32, message: String },
    Dispatched,
    Interrupt(u32),
    NextValidId(i32),
    ManagedAccounts(String),
    CurrentTime(i64),
    OrderStatus(OrderStatus),
    ExecDetails(i32, Contract, Execution),
}

#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
    idle_ticks: Mutex<u32>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(i32, i32, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error { req_id, code, message } => Some((req_id, code, message)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn idle_ticks(&self) -> u32 {
        *self.idle_ticks.lock().unwrap()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Wrapper for Recorder {
    fn connect_ack(&self) {
        self.push(Event::ConnectAck);
    }
    fn connection_closed(&self) {
        self.push(Event::ConnectionClosed);
    }
    fn error(&self, req_id: i32, _error_time: i64, code: i32, message: &str, _json: &str) {
        self.push(Event::Error {
            req_id,
            code,
            message: message.to_string(),
        });
    }
    fn idle_tick(&self) {
        *self.idle_ticks.lock().unwrap() += 1;
    }
    fn message_dispatched(&self) {
        self.push(Event::Dispatched);
    }
    fn interrupt_received(&self, count: u32) {
        self.push(Event::Interrupt(count));
    }
    fn next_valid_id(&self, order_id: i32) {
        self.push(Event::NextValidId(order_id));
    }
    fn managed_accounts(&self, accounts: &str) {
        self.push(Event::ManagedAccounts(accounts.to_string()));
    }
    fn current_time(&self, time: i64) {
        self.push(Event::CurrentTime(time));
    }
    fn order_status(&self, status: &OrderStatus) {
        self.push(Event::OrderStatus(status.clone()));
    }
    fn exec_details(&self, req_id: i32, contract: &Contract, execution: &Execution) {
        self.push(Event::ExecDetails(req_id, contract.clone(), execution.clone()));
    }
}

// ============================================================================
// Scripted terminal
// ============================================================================

/// Terminal side of an in-memory connection.
pub struct FakeTerminal {
    stream: DuplexStream,
}

impl FakeTerminal {
    /// Reads `"API\0"` plus the version range and returns the range text.
    pub async fn read_hello(&mut self) -> String {
        let mut sign = [0u8; 4];
        self.stream.read_exact(&mut sign).await.unwrap();
        assert_eq!(&sign, b"API\0");
        String::from_utf8(self.read_payload().await).unwrap()
    }

    pub async fn reply_handshake(&mut self, version: &str) {
        self.send_fields(&[version, CONNECTION_TIME]).await;
    }

    /// One length-prefixed frame, prefix removed.
    pub async fn read_payload(&mut self) -> Vec<u8> {
        let len = self.stream.read_u32().await.unwrap() as usize;
        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload).await.unwrap();
        payload
    }

    /// Next legacy frame sent with a text id, id included.
    pub async fn read_fields(&mut self) -> Vec<String> {
        read_fields(&self.read_payload().await)
    }

    /// Legacy frame with a text id (versions below raw-id framing).
    pub async fn send_fields(&mut self, fields: &[&str]) {
        let mut payload = Vec::new();
        for f in fields {
            payload.extend_from_slice(f.as_bytes());
            payload.push(0);
        }
        self.send_payload(&payload).await;
    }

    pub async fn send_payload(&mut self, payload: &[u8]) {
        self.stream.write_u32(payload.len() as u32).await.unwrap();
        self.stream.write_all(payload).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    /// Everything the client writes until it closes its side.
    pub async fn read_to_end(&mut self) -> Vec<u8> {
        let mut rest = Vec::new();
        self.stream.read_to_end(&mut rest).await.unwrap();
        rest
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        connect_timeout_ms: 2_000,
        queue_poll_ms: 20,
        ..ClientConfig::default()
    }
}

pub fn new_client() -> (Arc<Client>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let client = Arc::new(Client::new(recorder.clone(), test_config()));
    (client, recorder)
}

pub fn duplex_pair() -> (DuplexStream, FakeTerminal) {
    let (client_side, terminal_side) = tokio::io::duplex(64 * 1024);
    (client_side, FakeTerminal { stream: terminal_side })
}

/// Client connected at `version`, with the `startApi` frame already
/// consumed by the terminal.
pub async fn connected(version: i32) -> (Arc<Client>, Arc<Recorder>, FakeTerminal) {
    let (client, recorder) = new_client();
    let (stream, mut terminal) = duplex_pair();

    let version_text = version.to_string();
    let (res, _) = tokio::join!(client.connect_with_stream(stream, 0), async {
        terminal.read_hello().await;
        terminal.reply_handshake(&version_text).await;
        terminal.read_payload().await
    });
    res.expect("handshake");

    (client, recorder, terminal)
}

/// Polls `cond` until it holds or a second passes.
pub async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
