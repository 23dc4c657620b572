//! Error types for the handshake and the channel around it.

use thiserror::Error;
use wildcurve_crypto::CryptoError;

/// Top-level channel error.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cryptographic failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error("handshake failure: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("transport i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake timed out")]
    Timeout,
}

/// Protocol-level handshake failures. Any of these moves the session to
/// its terminal failed state; the peer cannot be recovered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("malformed message, expected a tuple of {expected} integers")]
    MalformedMessage { expected: usize },

    #[error("malformed application frame")]
    MalformedFrame,

    #[error("challenge digest mismatch, peer derived a different key")]
    AuthenticationMismatch,

    #[error("operation not valid in the current session state")]
    InvalidState,

    #[error("connection closed before the handshake completed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
