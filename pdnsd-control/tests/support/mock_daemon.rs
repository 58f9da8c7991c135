//! Mock pdnsd control endpoint

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use pdnsd_control::{Connector, ControlConfig, Result, UnixConnector};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    sync::oneshot,
    task::JoinHandle,
};

/// A decoded frame field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    U16(u16),
    U32(u32),
    Str(String),
    Raw(Vec<u8>),
}

/// What the mock sends back once it has read the request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Result code followed by an optional message
    Code(u16, Option<Vec<u8>>),
    /// Raw status report, then close
    Stream(Vec<u8>),
    /// Read the request, then hold the connection open without answering
    Silent,
}

/// A mock daemon serving exactly one connection
pub struct MockDaemon {
    cache_dir: TempDir,
    request: oneshot::Receiver<Vec<Field>>,
    handle: JoinHandle<()>,
}

impl MockDaemon {
    /// Bind the socket and start serving a single exchange
    pub fn start(reply: MockReply) -> Self {
        let cache_dir = TempDir::new().unwrap();
        let listener = UnixListener::bind(cache_dir.path().join("pdnsd.status")).unwrap();
        let (tx, request) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let (mut stream, _addr) = listener.accept().await.unwrap();
            let fields = read_frame(&mut stream).await;
            let _ = tx.send(fields);

            match reply {
                MockReply::Code(code, message) => {
                    stream.write_all(&code.to_be_bytes()).await.unwrap();
                    if let Some(message) = message {
                        stream.write_all(&message).await.unwrap();
                    }
                }
                MockReply::Stream(report) => {
                    stream.write_all(&report).await.unwrap();
                }
                MockReply::Silent => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
            let _ = stream.shutdown().await;
        });

        Self {
            cache_dir,
            request,
            handle,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.path()
    }

    pub fn config(&self) -> ControlConfig {
        ControlConfig::default().with_cache_dir(self.cache_dir())
    }

    /// The fields of the request the mock received
    pub async fn received(self) -> Vec<Field> {
        let fields = self.request.await.expect("mock daemon saw no request");
        self.handle.abort();
        fields
    }
}

async fn read_str(stream: &mut UnixStream) -> Field {
    let len = stream.read_u16().await.unwrap();
    let mut buf = vec![0u8; usize::from(len)];
    stream.read_exact(&mut buf).await.unwrap();
    Field::Str(String::from_utf8(buf).unwrap())
}

async fn read_u16(stream: &mut UnixStream) -> Field {
    Field::U16(stream.read_u16().await.unwrap())
}

async fn read_u32(stream: &mut UnixStream) -> Field {
    Field::U32(stream.read_u32().await.unwrap())
}

async fn read_raw(stream: &mut UnixStream, len: usize) -> Field {
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await.unwrap();
    Field::Raw(buf)
}

/// Decode a request frame the way the daemon does, driven by its opcode
async fn read_frame(stream: &mut UnixStream) -> Vec<Field> {
    let opcode = stream.read_u16().await.unwrap();
    let mut fields = vec![Field::U16(opcode)];

    match opcode {
        1 => {}
        2 => {
            fields.push(read_str(stream).await);
            fields.push(read_u16(stream).await);
            fields.push(read_str(stream).await);
        }
        3 => {
            fields.push(read_u16(stream).await);
            fields.push(read_str(stream).await);
        }
        4 => {
            fields.push(read_str(stream).await);
            fields.push(read_str(stream).await);
            fields.push(read_u32(stream).await);
            fields.push(read_u16(stream).await);
            fields.push(read_u16(stream).await);
        }
        5 => {
            let rr_type = stream.read_u16().await.unwrap();
            fields.push(Field::U16(rr_type));
            fields.push(read_str(stream).await);
            fields.push(read_u32(stream).await);
            fields.push(read_u16(stream).await);
            match rr_type {
                1 => fields.push(read_raw(stream, 4).await),
                28 => fields.push(read_raw(stream, 16).await),
                5 | 12 => fields.push(read_str(stream).await),
                15 => {
                    fields.push(read_u16(stream).await);
                    fields.push(read_str(stream).await);
                }
                other => panic!("mock daemon cannot add type {other}"),
            }
        }
        6 => {
            fields.push(read_str(stream).await);
            fields.push(read_u16(stream).await);
            fields.push(read_u32(stream).await);
        }
        other => panic!("mock daemon got unknown opcode {other}"),
    }

    fields
}

/// Connector that counts how often a connection was requested
pub struct CountingConnector {
    inner: UnixConnector,
    connects: AtomicUsize,
}

impl CountingConnector {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: UnixConnector::new(socket_path),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for CountingConnector {
    type Stream = UnixStream;

    async fn connect(&self) -> Result<UnixStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.inner.connect().await
    }
}
