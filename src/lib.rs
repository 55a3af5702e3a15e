//! Schema validation, request building/signing, and websocket streaming for
//! the ICON 2.0 JSON-RPC surface.
//!
//! This crate implements three largely independent subsystems:
//! - [`schema`] / [`scalars`]: a reflective value validator and
//!   bidirectional wire codec.
//! - [`request`] / [`goloop`]: typed JSON-RPC request constructors plus
//!   transaction signing.
//! - [`stream`]: a stateful websocket subscription buffer.
//!
//! The HTTP and websocket transports themselves are modeled only as traits
//! ([`transport::HttpTransport`], [`transport::WebsocketTransport`]) —
//! this crate never talks to a socket directly.

pub mod error;
pub mod goloop;
pub mod identity;
pub mod request;
pub mod scalars;
pub mod schema;
pub mod stream;
pub mod transport;
pub mod value;

pub use error::{Error, ErrorReason};
pub use identity::{Identity, IdentityOptions, NetworkId};
pub use request::{sign, verify, Request, RequestOptions};
pub use value::Value;
