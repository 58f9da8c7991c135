//! Control protocol frames and reply decoding
//!
//! A request is a single frame: a big-endian `u16` opcode followed by the
//! command's fields. Strings are sent as a big-endian `u16` length followed by
//! the raw bytes, addresses as raw octets, TTLs as big-endian 32-bit values.
//!
//! The reply is either the daemon's status report, streamed until the daemon
//! closes the connection, or a `u16` result code optionally followed by an
//! error message of at most [`MAX_MESSAGE_LEN`] bytes.

use std::net::{Ipv4Addr, Ipv6Addr};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::{
    ControlError, Result,
    error::MISSING_MESSAGE,
    grammar::{Command, RecordAction, ServerAction},
    rrtype,
};

/// TTL used when a command does not specify one
pub const DEFAULT_TTL: u32 = 900;

/// Longest error message the daemon sends after a non-zero result code
pub const MAX_MESSAGE_LEN: usize = 255;

/// Read buffer for the streamed status report
pub const STATUS_CHUNK: usize = 1024;

/// Flags word sent with injected records and sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFlags(u16);

impl RecordFlags {
    /// The record is local/authoritative rather than learned upstream
    pub const LOCAL: Self = Self(0x0001);
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_local(self) -> bool {
        self.0 & Self::LOCAL.0 != 0
    }
}

impl Default for RecordFlags {
    fn default() -> Self {
        Self::LOCAL
    }
}

/// Type-specific part of an `add` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ptr(String),
    Cname(String),
    Mx { preference: u16, exchange: String },
}

impl RecordData {
    #[must_use]
    pub const fn rr_type(&self) -> u16 {
        match self {
            Self::A(_) => rrtype::A,
            Self::Aaaa(_) => rrtype::AAAA,
            Self::Ptr(_) => rrtype::PTR,
            Self::Cname(_) => rrtype::CNAME,
            Self::Mx { .. } => rrtype::MX,
        }
    }
}

/// A request to the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Dump the daemon's status report
    Status,
    /// Change the state of an upstream server section
    Server {
        label: String,
        action: ServerAction,
        /// Comma separated server addresses, empty when not given
        addresses: String,
    },
    /// Drop or invalidate a cached name
    Record { name: String, action: RecordAction },
    /// Load a hosts-style file into the cache
    Source {
        path: String,
        owner: String,
        ttl: u32,
        serve_aliases: bool,
        flags: RecordFlags,
    },
    /// Inject a single record
    Add {
        name: String,
        ttl: u32,
        flags: RecordFlags,
        data: RecordData,
    },
    /// Add a negatively cached name or name/type pair
    Neg { name: String, rr_type: u16, ttl: u32 },
}

/// How the daemon answers a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Raw bytes until the daemon closes the connection
    Stream,
    /// Result code, then a message if the code is non-zero
    ResultCode,
}

impl Request {
    #[must_use]
    pub const fn command(&self) -> Command {
        match self {
            Self::Status => Command::Status,
            Self::Server { .. } => Command::Server,
            Self::Record { .. } => Command::Record,
            Self::Source { .. } => Command::Source,
            Self::Add { .. } => Command::Add,
            Self::Neg { .. } => Command::Neg,
        }
    }

    #[must_use]
    pub const fn reply_kind(&self) -> ReplyKind {
        match self {
            Self::Status => ReplyKind::Stream,
            _ => ReplyKind::ResultCode,
        }
    }

    /// Serialize the request into a complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::FieldTooLong`] if a string does not fit its
    /// length prefix.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut frame = FrameWriter::default();

        // Remote commands always carry an opcode
        frame.put_u16(self.command().opcode().unwrap_or_default());

        match self {
            Self::Status => {}
            Self::Server {
                label,
                action,
                addresses,
            } => {
                frame.put_str("server label", label)?;
                frame.put_u16(*action as u16);
                frame.put_str("server addresses", addresses)?;
            }
            Self::Record { name, action } => {
                frame.put_u16(*action as u16);
                frame.put_str("record name", name)?;
            }
            Self::Source {
                path,
                owner,
                ttl,
                serve_aliases,
                flags,
            } => {
                frame.put_str("source file", path)?;
                frame.put_str("owner", owner)?;
                frame.put_u32(*ttl);
                frame.put_u16(u16::from(*serve_aliases));
                frame.put_u16(flags.bits());
            }
            Self::Add {
                name,
                ttl,
                flags,
                data,
            } => {
                frame.put_u16(data.rr_type());
                frame.put_str("record name", name)?;
                frame.put_u32(*ttl);
                frame.put_u16(flags.bits());
                match data {
                    RecordData::A(addr) => frame.put_slice(&addr.octets()),
                    RecordData::Aaaa(addr) => frame.put_slice(&addr.octets()),
                    RecordData::Ptr(target) | RecordData::Cname(target) => {
                        frame.put_str("target name", target)?;
                    }
                    RecordData::Mx {
                        preference,
                        exchange,
                    } => {
                        frame.put_u16(*preference);
                        frame.put_str("mail exchanger", exchange)?;
                    }
                }
            }
            Self::Neg { name, rr_type, ttl } => {
                frame.put_str("domain name", name)?;
                frame.put_u16(*rr_type);
                frame.put_u32(*ttl);
            }
        }

        trace!("Encoded {:?} frame: {} bytes", self.command(), frame.0.len());
        Ok(frame.0)
    }
}

#[derive(Default)]
struct FrameWriter(Vec<u8>);

impl FrameWriter {
    fn put_u16(&mut self, value: u16) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    fn put_str(&mut self, field: &'static str, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| ControlError::FieldTooLong {
            field,
            len: value.len(),
        })?;
        self.put_u16(len);
        self.put_slice(value.as_bytes());
        Ok(())
    }
}

/// Copy the status report to `out` until the daemon closes the connection.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns an error if reading from the daemon or writing to `out` fails.
pub async fn copy_status<R, W>(reader: &mut R, out: &mut W) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = [0u8; STATUS_CHUNK];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
        crate::incoming!("Status chunk: {} bytes", n);
        total += n as u64;
    }
    out.flush().await?;

    debug!("Status report complete: {total} bytes");
    Ok(total)
}

/// Read the result header of a reply.
///
/// # Errors
///
/// Returns [`ControlError::Daemon`] when the daemon reports failure,
/// [`ControlError::ConnectionClosed`] if the connection ends before the
/// result code, or an I/O error.
pub async fn read_result<R>(reader: &mut R) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let code = reader.read_u16().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ControlError::ConnectionClosed
        } else {
            ControlError::Io(e)
        }
    })?;

    crate::incoming!(level = DEBUG, "Result code: {}", code);
    if code == 0 {
        return Ok(());
    }

    // A single read: whatever arrives is the whole message.
    let mut buf = [0u8; MAX_MESSAGE_LEN];
    let message = match reader.read(&mut buf).await {
        Ok(n) if n > 0 => String::from_utf8_lossy(&buf[..n]).into_owned(),
        Ok(_) => MISSING_MESSAGE.to_string(),
        Err(e) => {
            debug!("Reading error message failed: {e}");
            MISSING_MESSAGE.to_string()
        }
    };

    Err(ControlError::Daemon { code, message })
}
