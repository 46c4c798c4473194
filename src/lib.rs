//! Diagnostic client for control-panel backends.
//!
//! This crate exercises a backend speaking newline-delimited JSON over TCP:
//! it maintains one live connection per session, reassembles frames out of
//! arbitrary chunking, and lets a sequential caller wait for a specific reply
//! type among an unordered stream of asynchronous arrivals. Scripted
//! exercises and a stress generator sit on top and aggregate pass/fail
//! results.

pub mod codec;
pub mod connection;
pub mod correlation;
pub mod error;
pub mod message;
pub mod report;
pub mod runner;
pub mod scenarios;

pub use codec::{DecodedLine, PanelCodec};
pub use connection::{ConnectionState, PanelConnection};
pub use correlation::Inbox;
pub use error::{ConnectError, SendError};
pub use message::PanelMessage;
pub use report::{Summary, TestReport, TestResult};
pub use runner::PanelTester;
