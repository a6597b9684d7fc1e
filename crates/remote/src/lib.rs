//! Boundary to the remote filesystem API.
//!
//! The core never talks HTTP directly: it goes through the [`RemoteFs`]
//! trait, which [`HttpRemote`] implements on top of `reqwest` with a
//! cookie-backed session. Tests substitute in-memory mocks.

pub mod error;
pub mod http;
pub mod remote;

pub use error::{ErrorKind, RemoteError};
pub use http::HttpRemote;
pub use remote::{RemoteFs, RemoteFuture};
