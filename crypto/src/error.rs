//! Error types for the cryptographic primitives

use thiserror::Error;

/// Errors produced by parameter generation and the cipher primitives
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The curve coefficients describe a singular curve (zero discriminant)
    #[error("singular curve: discriminant vanishes mod p")]
    InvalidCurve,

    /// Primality testing is undefined for n <= 1
    #[error("primality test is indeterminate for n <= 1")]
    IndeterminatePrimalityInput,

    /// Cipher key length is not one of the supported sizes
    #[error("cipher key must be 16 or 32 bytes, found {0}")]
    InvalidKeyLength(usize),

    /// Cipher round count is not one of the defined variants
    #[error("cipher rounds must be 8, 12, or 20, found {0}")]
    InvalidRoundCount(u8),

    /// A primitive was driven in a way its contract forbids
    /// (e.g. a short cipher block followed by more data)
    #[error("protocol misuse: {0}")]
    ProtocolMisuse(&'static str),
}

/// Result type for cryptographic operations
pub type Result<T> = core::result::Result<T, CryptoError>;
