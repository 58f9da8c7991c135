//! Control protocol for managing a running pdnsd instance
//!
//! pdnsd listens on a Unix domain socket in its cache directory. This crate
//! provides the client side of that channel:
//! - Resolve command tokens against a fixed grammar
//! - Validate arguments and build typed requests
//! - Encode requests into binary frames and decode the daemon's reply
//!
//! Each invocation is a single connect, request, reply, close exchange.

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod grammar;
pub mod logging;
pub mod protocol;
pub mod rrtype;
pub mod session;

pub use client::{ControlClient, Connector, Reply, UnixConnector};
pub use config::{ControlConfig, DEFAULT_CACHE_DIR, STATUS_SOCKET_NAME};
pub use error::{CLIENT_FAILURE_EXIT, ControlError, Result};
pub use grammar::{Capabilities, Command, Grammar};
pub use protocol::{DEFAULT_TTL, RecordData, RecordFlags, Request};
pub use session::{Invocation, Outcome};

#[doc(hidden)]
pub use tracing;
