//! Test support utilities for control socket testing
//!
//! Provides a mock daemon that listens on `pdnsd.status` inside a temporary
//! cache directory, decodes one request frame field by field and answers with
//! a scripted reply.

pub mod mock_daemon;

pub use mock_daemon::{CountingConnector, Field, MockDaemon, MockReply};
