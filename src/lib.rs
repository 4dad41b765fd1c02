//! A client library for the [VTube Studio API], focused on the
//! request/response handshake and a small set of model control commands.
//!
//! [VTube Studio API]: https://github.com/DenchiSoft/VTubeStudio
//!
//! # Basic usage
//!
//! ```no_run
//! # async fn run() -> Result<(), vts_controller::Error> {
//! use vts_controller::session::SessionBuilder;
//!
//! let session = SessionBuilder::new()
//!     .url("ws://localhost:8001")
//!     .plugin_name("MyPlugin")
//!     .plugin_developer("Me")
//!     .connect()
//!     .await?;
//!
//! // The user accepts or denies a pop-up in the VTube Studio app.
//! if session.authenticate().await? {
//!     for model in session.available_models().await? {
//!         println!("{}: {}", model.model_id, model.model_name);
//!     }
//! }
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! Each session owns one websocket connection and serializes its requests, so
//! exactly one request is outstanding at a time. Authentication requests a
//! fresh token on every handshake; persisting tokens is left to the caller.
//!
//! The default transport uses [`tokio-tungstenite`](tokio_tungstenite) and can
//! be disabled by opting out of the `tokio-tungstenite` feature; see
//! [`codec::MessageCodec`] for plugging in another websocket library.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
pub mod codec;
pub mod data;
pub mod error;
pub mod observer;
pub mod service;
pub mod session;
pub mod transport;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::observer::Observer;
pub use crate::session::{Session, SessionBuilder};
