use std::io;

use thiserror::Error;

/// Every failure this crate can produce, from a refused handshake to a torn rectangle.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed, or the stream closed in the middle of a message.
    #[error("network error: {0}")]
    Network(#[from] io::Error),

    /// The stream was closed (cleanly or otherwise) before the expected bytes arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The server's greeting was below `RFB 003.003`.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    /// The server offered no security type this client can satisfy.
    #[error("no acceptable security type offered by server")]
    InvalidSecurityType,

    /// VNC authentication was rejected, with the server's reason if it gave one.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The server closed the connection after too many failed authentication attempts.
    #[error("too many authentication attempts")]
    AuthTooMany,

    /// The host's password callback declined to provide a password.
    #[error("authentication aborted: no password supplied")]
    AuthAborted,

    /// A message or encoding violated the wire protocol in a way that cannot be resynced.
    #[error("protocol error: {0}")]
    Protocol(&'static str),

    /// A compressed or packed rectangle could not be decoded.
    #[error("failed to decode rectangle: {0}")]
    Decode(String),

    /// The caller used the public API out of its required order.
    #[error("invalid use of client API: {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
