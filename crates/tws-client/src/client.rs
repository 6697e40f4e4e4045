// crates/tws-client/src/client.rs

//! Client façade.
//!
//! One `Client` owns everything about one terminal connection: state,
//! negotiated session, the writer half, the reader task and the hand-off
//! queue. Send methods never return errors; every failure ends up as a
//! single `Wrapper::error` call with the vendor code.
//!
//! Sending a request follows the same steps everywhere:
//! 1. protobuf-capable message at a version that wants protobuf → send the
//!    protobuf body;
//! 2. not connected → `NOT_CONNECTED`;
//! 3. encode the legacy layout (this may abort with `UPDATE_TWS`) and send.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tws_core::error_codes::{self, ErrorCode};
use tws_core::server_versions;
use tws_core::{
    ConnectionState, Contract, ExecutionFilter, OrderCancel, TagValue, Wrapper, NO_VALID_ID,
};
use tws_protocol::wire_types::validate_ascii;
use tws_protocol::FrameCodec;

use crate::config::ClientConfig;
use crate::dispatcher::{self, Dispatcher};
use crate::error::ClientError;
use crate::handshake;
use crate::reader::{self, ReaderHandle};
use crate::requests::{self, Request};
use crate::transport::{self, FrameWriter};
use crate::types::{self, Inbox, QueueDepth, Session};

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    session: Option<Session>,
    /// Queue of the latest connection, until `run` takes it.
    pending: Option<Inbox>,
    depth: Option<QueueDepth>,
    reader: Option<ReaderHandle>,
    connect_options: String,
    optional_capabilities: String,
}

pub struct Client {
    wrapper: Arc<dyn Wrapper>,
    config: ClientConfig,
    inner: Mutex<Inner>,
    writer: tokio::sync::Mutex<Option<FrameWriter>>,
    interrupt_tx: mpsc::UnboundedSender<()>,
    interrupt_rx: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
}

impl Client {
    pub fn new(wrapper: Arc<dyn Wrapper>, config: ClientConfig) -> Self {
        let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
        let inner = Inner {
            connect_options: config.connect_options.clone(),
            optional_capabilities: config.optional_capabilities.clone(),
            ..Inner::default()
        };
        Self {
            wrapper,
            config,
            inner: Mutex::new(inner),
            writer: tokio::sync::Mutex::new(None),
            interrupt_tx,
            interrupt_rx: Mutex::new(Some(interrupt_rx)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Connection lifecycle
    // ========================================================================

    /// Open a TCP connection and run the handshake.
    ///
    /// Failures are reported through the wrapper and also returned.
    pub async fn connect(&self, host: &str, port: u16, client_id: i32) -> Result<(), ClientError> {
        if let Err(e) = check_ascii(host) {
            return Err(self.fail(NO_VALID_ID, e, error_codes::CONNECT_FAIL));
        }
        self.begin_connect()?;

        let stream = match transport::connect_tcp(host, port, self.config.connect_timeout()).await {
            Ok(stream) => stream,
            Err(e) => {
                let e = self.fail(NO_VALID_ID, e, error_codes::CONNECT_FAIL);
                self.disconnect().await;
                return Err(e);
            }
        };

        self.establish(stream, client_id).await
    }

    /// Handshake over a stream the caller already opened.
    pub async fn connect_with_stream<S>(&self, stream: S, client_id: i32) -> Result<(), ClientError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        self.begin_connect()?;
        self.establish(stream, client_id).await
    }

    /// `Disconnected → Connecting`. The strings the handshake will carry
    /// are checked first, so a bad string reports 579 in any state.
    fn begin_connect(&self) -> Result<(), ClientError> {
        let checked = {
            let mut inner = self.lock();
            check_ascii(&inner.connect_options)
                .and_then(|_| check_ascii(&inner.optional_capabilities))
                .and_then(|_| match inner.state {
                    ConnectionState::Disconnected => {
                        inner.state = ConnectionState::Connecting;
                        Ok(())
                    }
                    _ => Err(ClientError::AlreadyConnected),
                })
        };
        checked.map_err(|e| self.fail(NO_VALID_ID, e, error_codes::CONNECT_FAIL))
    }

    async fn establish<S>(&self, stream: S, client_id: i32) -> Result<(), ClientError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (mut frames, mut writer) = transport::split(stream);
        let options = self.lock().connect_options.clone();

        let handshake = tokio::time::timeout(
            self.config.connect_timeout(),
            handshake::perform(&mut frames, &mut writer, &options),
        )
        .await
        .unwrap_or_else(|_| Err(ClientError::ConnectFailed("handshake timed out".to_string())));

        let reply = match handshake {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                warn!("Connection closed during handshake");
                self.disconnect().await;
                return Err(ClientError::ConnectionClosed);
            }
            Err(e) => {
                let e = self.fail(NO_VALID_ID, e, error_codes::CONNECT_FAIL);
                self.disconnect().await;
                return Err(e);
            }
        };

        let version = reply.server_version;
        if !server_versions::is_supported_version(version) {
            let e = self.fail(
                NO_VALID_ID,
                ClientError::UnsupportedVersion(version),
                error_codes::CONNECT_FAIL,
            );
            self.disconnect().await;
            return Err(e);
        }

        *self.writer.lock().await = Some(writer);

        let (sender, inbox) = types::inbox(version);
        let promoted = {
            let mut inner = self.lock();
            // disconnect() may have run while the handshake was in flight
            if inner.state == ConnectionState::Connecting {
                inner.state = ConnectionState::Connected;
                inner.session = Some(Session {
                    server_version: version,
                    connection_time: reply.connection_time.clone(),
                    client_id,
                });
                inner.depth = Some(inbox.depth());
                inner.pending = Some(inbox);
                inner.reader = Some(reader::spawn(frames, sender));
                true
            } else {
                false
            }
        };
        if !promoted {
            if let Some(writer) = self.writer.lock().await.take() {
                writer.shutdown().await;
            }
            return Err(ClientError::ConnectionClosed);
        }

        info!(
            "Connected: server version {}, connection time {}",
            version, reply.connection_time
        );

        let capabilities = self.lock().optional_capabilities.clone();
        self.send_request(
            NO_VALID_ID,
            requests::start_api(client_id, &capabilities),
            error_codes::FAIL_SEND_STARTAPI,
        )
        .await;

        self.wrapper.connect_ack();
        Ok(())
    }

    /// Close the connection. Idempotent; `connection_closed` fires only on
    /// an actual transition. Frames already queued stay queued for `run`.
    pub async fn disconnect(&self) {
        let (previous, reader) = {
            let mut inner = self.lock();
            let previous = inner.state;
            inner.state = ConnectionState::Disconnected;
            inner.session = None;
            (previous, inner.reader.take())
        };

        if let Some(writer) = self.writer.lock().await.take() {
            writer.shutdown().await;
        }
        if let Some(reader) = reader {
            reader.stop().await;
        }

        if previous != ConnectionState::Disconnected {
            info!("Disconnected");
            self.wrapper.connection_closed();
        }
    }

    /// Disconnect and forget everything about the last connection,
    /// including queued frames and pending interrupts.
    pub async fn reset(&self) {
        self.disconnect().await;

        {
            let mut inner = self.lock();
            inner.pending = None;
            inner.depth = None;
            inner.connect_options = self.config.connect_options.clone();
            inner.optional_capabilities = self.config.optional_capabilities.clone();
        }

        if let Some(rx) = self
            .interrupt_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            while rx.try_recv().is_ok() {}
        }
    }

    // ========================================================================
    // Run loop
    // ========================================================================

    /// Dispatch incoming frames until the connection ends and the queue is
    /// drained, a fatal frame arrives, or too many interrupts pile up.
    ///
    /// Leaves the client disconnected when it returns. Dropping the future
    /// part way through leaves the connection and its queue in place for
    /// the next `run`.
    pub async fn run(&self) {
        let Some(interrupts) = self
            .interrupt_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            warn!("run() is already active");
            return;
        };

        let mut resources = RunResources {
            client: self,
            inbox: self.lock().pending.take(),
            interrupts: Some(interrupts),
        };
        match (resources.inbox.as_mut(), resources.interrupts.as_mut()) {
            (Some(inbox), Some(interrupts)) => {
                let mut dispatcher =
                    Dispatcher::new(self.wrapper.clone(), inbox.server_version());
                dispatcher::run_loop(
                    &mut dispatcher,
                    inbox,
                    interrupts,
                    self.config.queue_poll(),
                    || self.is_connected(),
                )
                .await;
            }
            _ => debug!("No connection to run"),
        }

        if let Some(inbox) = resources.inbox.take() {
            if !inbox.is_empty() {
                debug!("Discarding {} undispatched frames", inbox.len());
            }
        }
        drop(resources);

        self.disconnect().await;

        let mut inner = self.lock();
        if inner.pending.is_none() {
            inner.depth = None;
        }
    }

    /// Ask the run loop to interrupt. More than
    /// [`dispatcher::MAX_INTERRUPTS`] in one run stops it.
    pub fn interrupt(&self) {
        if self.interrupt_tx.send(()).is_err() {
            debug!("Interrupt dropped, receiver gone");
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_connected(&self) -> bool {
        self.lock().state.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Negotiated version, 0 when not connected.
    pub fn server_version(&self) -> i32 {
        self.lock().session.as_ref().map_or(0, |s| s.server_version)
    }

    pub fn connection_time(&self) -> Option<String> {
        self.lock().session.as_ref().map(|s| s.connection_time.clone())
    }

    pub fn client_id(&self) -> Option<i32> {
        self.lock().session.as_ref().map(|s| s.client_id)
    }

    /// Frames read off the socket and not yet dispatched.
    pub fn pending_frames(&self) -> usize {
        self.lock().depth.as_ref().map_or(0, QueueDepth::get)
    }

    /// Takes effect on the next connect.
    pub fn set_connect_options(&self, options: &str) {
        self.lock().connect_options = options.to_string();
    }

    /// Takes effect on the next connect.
    pub fn set_optional_capabilities(&self, capabilities: &str) {
        self.lock().optional_capabilities = capabilities.to_string();
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub async fn req_current_time(&self) {
        self.send_request(
            NO_VALID_ID,
            requests::req_current_time(),
            error_codes::FAIL_SEND_REQCURRTIME,
        )
        .await;
    }

    pub async fn req_current_time_in_millis(&self) {
        self.send_request(
            NO_VALID_ID,
            requests::req_current_time_in_millis(),
            error_codes::FAIL_SEND_REQCURRTIMEINMILLIS,
        )
        .await;
    }

    /// `num_ids` is ignored by current terminals; the reply is one
    /// `next_valid_id`.
    pub async fn req_ids(&self, num_ids: i32) {
        self.send_request(NO_VALID_ID, requests::req_ids(num_ids), error_codes::FAIL_SEND_REQIDS)
            .await;
    }

    pub async fn req_managed_accts(&self) {
        self.send_request(
            NO_VALID_ID,
            requests::req_managed_accts(),
            error_codes::FAIL_SEND_REQMANAGEDACCTS,
        )
        .await;
    }

    pub async fn req_mkt_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        generic_tick_list: &str,
        snapshot: bool,
        regulatory_snapshot: bool,
        options: &[TagValue],
    ) {
        let request = requests::req_mkt_data(
            ticker_id,
            contract,
            generic_tick_list,
            snapshot,
            regulatory_snapshot,
            options,
        );
        self.send_request(ticker_id, request, error_codes::FAIL_SEND_REQMKT)
            .await;
    }

    pub async fn cancel_mkt_data(&self, ticker_id: i32) {
        self.send_request(
            ticker_id,
            requests::cancel_mkt_data(ticker_id),
            error_codes::FAIL_SEND_CANMKT,
        )
        .await;
    }

    pub async fn req_market_data_type(&self, market_data_type: i32) {
        self.send_request(
            NO_VALID_ID,
            requests::req_market_data_type(market_data_type),
            error_codes::FAIL_SEND_REQMARKETDATATYPE,
        )
        .await;
    }

    pub async fn req_account_summary(&self, req_id: i32, group: &str, tags: &str) {
        self.send_request(
            req_id,
            requests::req_account_summary(req_id, group, tags),
            error_codes::FAIL_SEND_REQACCOUNTDATA,
        )
        .await;
    }

    pub async fn cancel_account_summary(&self, req_id: i32) {
        self.send_request(
            req_id,
            requests::cancel_account_summary(req_id),
            error_codes::FAIL_SEND_CANACCOUNTDATA,
        )
        .await;
    }

    pub async fn req_executions(&self, req_id: i32, filter: &ExecutionFilter) {
        self.send_request(
            req_id,
            requests::req_executions(req_id, filter),
            error_codes::FAIL_SEND_EXEC,
        )
        .await;
    }

    pub async fn cancel_order(&self, order_id: i32, cancel: &OrderCancel) {
        self.send_request(
            order_id,
            requests::cancel_order(order_id, cancel),
            error_codes::FAIL_SEND_CORDER,
        )
        .await;
    }

    pub async fn req_global_cancel(&self, cancel: &OrderCancel) {
        self.send_request(
            NO_VALID_ID,
            requests::req_global_cancel(cancel),
            error_codes::FAIL_SEND_REQGLOBALCANCEL,
        )
        .await;
    }

    // ========================================================================
    // Sending
    // ========================================================================

    async fn send_request(&self, req_id: i32, request: Request, fail_code: ErrorCode) {
        if let Err(e) = self.try_send(&request).await {
            let lost_connection = matches!(e, ClientError::Io(_));
            self.fail(req_id, e, fail_code);
            if lost_connection {
                self.disconnect().await;
            }
        }
    }

    async fn try_send(&self, request: &Request) -> Result<(), ClientError> {
        let (connected, version) = {
            let inner = self.lock();
            (
                inner.state.is_connected(),
                inner.session.as_ref().map_or(0, |s| s.server_version),
            )
        };
        let codec = FrameCodec::new(version);

        let protobuf = request.protobuf.is_some() && codec.uses_protobuf(request.message_id());
        if !protobuf && !connected {
            return Err(ClientError::NotConnected);
        }

        let frame = request.encode(&codec)?;
        self.write(&frame).await
    }

    async fn write(&self, frame: &[u8]) -> Result<(), ClientError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::NotConnected)?;
        writer.send(frame).await
    }

    /// Report `err` through the wrapper and hand it back.
    fn fail(&self, req_id: i32, err: ClientError, fallback: ErrorCode) -> ClientError {
        let code = err.error_code(fallback);
        warn!("Request {} failed with {}: {}", req_id, code.code, err);
        self.wrapper.error(
            req_id,
            chrono::Utc::now().timestamp_millis(),
            code.code,
            &code.with_detail(&err.detail()),
            "",
        );
        err
    }
}

/// What `run` borrowed from the client. Handed back on drop so a cancelled
/// `run` does not strand the queue or the interrupt receiver.
struct RunResources<'a> {
    client: &'a Client,
    inbox: Option<Inbox>,
    interrupts: Option<mpsc::UnboundedReceiver<()>>,
}

impl Drop for RunResources<'_> {
    fn drop(&mut self) {
        if let Some(inbox) = self.inbox.take() {
            let mut inner = self.client.lock();
            // a newer connection's queue wins
            if inner.pending.is_none() {
                debug!("run cancelled, {} frames kept for the next run", inbox.len());
                inner.pending = Some(inbox);
            }
        }
        if let Some(interrupts) = self.interrupts.take() {
            *self
                .client
                .interrupt_rx
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(interrupts);
        }
    }
}

fn check_ascii(s: &str) -> Result<(), ClientError> {
    validate_ascii(s).map_err(|_| ClientError::InvalidSymbol(s.to_string()))
}
