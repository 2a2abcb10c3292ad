//! Resilient remote-call execution.
//!
//! This crate provides the [`CallExecutor`], which wraps every outbound HTTP
//! call of the pipeline in one retry policy: retry server errors and network
//! failures after a fixed delay, never retry client errors or unclassified
//! failures.
//!
//! The executor is generic over a [`Transport`] so tests can replay scripted
//! responses (see the `testing` feature) instead of touching the network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod executor;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
mod transport;

pub use config::{RetryConfig, RetryConfigBuilder};
pub use executor::{CallExecutor, classify};
pub use transport::{ReqwestTransport, Transport, TransportFailure};
