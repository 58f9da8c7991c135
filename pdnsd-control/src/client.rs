//! Client for connecting to the status control socket

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::UnixStream,
};
use tracing::{debug, trace};

use crate::{
    ControlError, Result,
    protocol::{self, ReplyKind, Request},
};

/// Opens the connection to the daemon.
///
/// The client calls [`Connector::connect`] exactly once per request.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// # Errors
    ///
    /// Returns an error if the connection cannot be established
    async fn connect(&self) -> Result<Self::Stream>;
}

/// Connects to a Unix domain socket
#[derive(Debug, Clone)]
pub struct UnixConnector {
    socket_path: PathBuf,
}

impl UnixConnector {
    #[must_use]
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

#[async_trait]
impl Connector for UnixConnector {
    type Stream = UnixStream;

    async fn connect(&self) -> Result<UnixStream> {
        debug!("Connecting to control socket: {}", self.socket_path.display());
        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ControlError::InvalidSocketPath(format!(
                    "Socket does not exist: {}",
                    self.socket_path.display()
                )),
                _ => ControlError::Io(e),
            })
    }
}

/// What a successful exchange produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The status report was copied to the output
    Streamed { bytes: u64 },
    /// The daemon returned result code 0
    Succeeded,
}

/// Client for communicating with the daemon's control socket
pub struct ControlClient<C = UnixConnector> {
    connector: C,
    timeout: Option<Duration>,
}

impl ControlClient<UnixConnector> {
    /// Create a new control client for the given socket path
    #[must_use]
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self::with_connector(UnixConnector::new(socket_path))
    }
}

impl<C: Connector> ControlClient<C> {
    #[must_use]
    pub const fn with_connector(connector: C) -> Self {
        Self {
            connector,
            timeout: None,
        }
    }

    /// Bound the whole exchange; without this a silent daemon blocks forever
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Send a request and interpret the reply.
    ///
    /// The frame is encoded before connecting, so an unencodable request never
    /// opens the socket. The connection is dropped when this returns, on
    /// success and failure alike.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be encoded
    /// - Connection or I/O fails
    /// - The request times out
    /// - The daemon returns a non-zero result code
    pub async fn send_request<W>(&self, request: &Request, out: &mut W) -> Result<Reply>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let frame = request.encode()?;

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.exchange(request, &frame, out))
                .await
                .map_err(|_| ControlError::Timeout)?,
            None => self.exchange(request, &frame, out).await,
        }
    }

    async fn exchange<W>(&self, request: &Request, frame: &[u8], out: &mut W) -> Result<Reply>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let mut stream = self.connector.connect().await?;

        crate::outgoing!("Sending request: {} bytes", frame.len());
        write_frame(&mut stream, frame).await?;

        let reply = match request.reply_kind() {
            ReplyKind::Stream => Reply::Streamed {
                bytes: protocol::copy_status(&mut stream, out).await?,
            },
            ReplyKind::ResultCode => {
                protocol::read_result(&mut stream).await?;
                Reply::Succeeded
            }
        };

        trace!("Closing control connection");
        Ok(reply)
    }
}

/// Write a whole frame; a peer that stops accepting bytes is fatal.
async fn write_frame<S>(stream: &mut S, frame: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < frame.len() {
        let n = stream.write(&frame[written..]).await?;
        if n == 0 {
            return Err(ControlError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        written += n;
    }
    stream.flush().await?;
    Ok(())
}
