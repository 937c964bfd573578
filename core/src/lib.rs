//! Core components for talking to the Game Jolt game API.
//!
//! This crate provides the foundational types shared by the `gamejolt` client
//! and the pluggable collaborators it runs on.
//!
//! ## Overview
//!
//! - **Context**: a container holding implementations for file reading, HTTP
//!   sending and environment access. The client never opens sockets or files
//!   itself, it always goes through the context.
//! - **Traits**: [`FileRead`], [`HttpSend`], [`Env`] and [`ProvideCredential`].
//! - **Error**: one error type with an [`ErrorKind`] for every failure class
//!   the client distinguishes.
//!
//! ## Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use gamejolt_core::{Context, HttpSend, Result};
//!
//! #[derive(Debug)]
//! struct Offline;
//!
//! #[async_trait::async_trait]
//! impl HttpSend for Offline {
//!     async fn http_send(&self, _: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
//!         Err(gamejolt_core::Error::transport_failed())
//!     }
//! }
//!
//! let ctx = Context::new().with_http_send(Offline);
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: MD5 helpers used for request signatures
//! - [`utils`]: redaction helpers for logging secrets

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod utils;

mod context;
pub use context::{Context, Env, FileRead, HttpSend, OsEnv, StaticEnv};
pub use context::{NoopEnv, NoopFileRead, NoopHttpSend};

mod error;
pub use error::{Error, ErrorKind, Result, REQUEST_FAILED, REQUIRES_AUTHENTICATION};

mod api;
pub use api::ProvideCredential;
