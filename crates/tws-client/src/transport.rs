// crates/tws-client/src/transport.rs

//! Socket plumbing.
//!
//! The stream is split once after connect: the read half goes to the
//! background reader, the write half stays with the client behind a lock.
//! Both halves are boxed so any `AsyncRead + AsyncWrite` works (a TCP socket
//! in production, an in-memory duplex in tests).

use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use tws_protocol::framing::{read_msg, FrameStatus};
use tws_protocol::wire_types::{HEADER_LEN, MAX_MSG_LEN};

use crate::error::ClientError;

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Open a TCP connection with `TCP_NODELAY`, bounded by `timeout`.
pub async fn connect_tcp(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, ClientError> {
    info!("Connecting to {}:{}...", host, port);

    let stream = match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(ClientError::ConnectFailed(e.to_string())),
        Err(_) => {
            return Err(ClientError::ConnectFailed(format!(
                "timed out after {} ms",
                timeout.as_millis()
            )))
        }
    };
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Split any duplex stream into framed halves.
pub fn split<S>(stream: S) -> (FrameReader, FrameWriter)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (r, w) = tokio::io::split(stream);
    (
        FrameReader {
            inner: Box::new(r),
            buf: BytesMut::with_capacity(64 * 1024),
        },
        FrameWriter { inner: Box::new(w) },
    )
}

/// One frame as read off the socket, length prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Length from the frame header. Differs from `payload.len()` only for
    /// oversized frames, whose body is never read.
    pub declared_len: usize,
    pub payload: Bytes,
}

impl RawFrame {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            declared_len: payload.len(),
            payload,
        }
    }

    pub fn oversized(declared_len: usize) -> Self {
        Self {
            declared_len,
            payload: Bytes::new(),
        }
    }

    pub fn is_oversized(&self) -> bool {
        self.declared_len > MAX_MSG_LEN
    }
}

pub struct FrameReader {
    inner: BoxedRead,
    buf: BytesMut,
}

impl FrameReader {
    /// Next frame, or `None` once the peer closed the stream.
    ///
    /// Cancel safe: bytes already received stay buffered.
    pub async fn read_frame(&mut self) -> Result<Option<RawFrame>, ClientError> {
        loop {
            if let Some(frame) = self.next_buffered() {
                return Ok(Some(frame));
            }

            let n = self.inner.read_buf(&mut self.buf).await?;
            if n == 0 {
                if !self.buf.is_empty() {
                    warn!("Connection closed with {} unframed bytes", self.buf.len());
                }
                return Ok(None);
            }
        }
    }

    /// Next frame already complete in the buffer, without touching the
    /// stream.
    pub fn next_buffered(&mut self) -> Option<RawFrame> {
        match read_msg(&self.buf) {
            FrameStatus::Complete { consumed, .. } => {
                let mut frame = self.buf.split_to(consumed);
                frame.advance(HEADER_LEN);
                Some(RawFrame::new(frame.freeze()))
            }
            FrameStatus::Oversized(declared) => {
                self.buf.clear();
                Some(RawFrame::oversized(declared))
            }
            FrameStatus::Incomplete => None,
        }
    }
}

pub struct FrameWriter {
    inner: BoxedWrite,
}

impl FrameWriter {
    /// Write one already-framed message.
    pub async fn send(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        self.inner.write_all(frame).await?;
        self.inner.flush().await?;
        debug!("Sent {} bytes", frame.len());
        Ok(())
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.inner.shutdown().await {
            debug!("Shutdown of write half failed: {}", e);
        }
    }
}
