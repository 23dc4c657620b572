//! Cryptographic core for ECDH over freshly generated elliptic curves.
//!
//! Unlike fixed-parameter ECDH, every session manufactures its own domain
//! parameters: a random pseudoprime field, a random nonsingular cubic
//! over it, and a generator discovered through the Hasse order estimate.
//! The shared point is hashed into key material for a from-scratch
//! Salsa20 stream cipher.
//!
//! Layers, bottom up:
//! - [`bigrand`]: random big integers from the OS entropy source
//! - [`primality`]: Miller-Rabin and pseudoprime generation
//! - [`field`] / [`curve`]: prime-field and curve-group arithmetic
//! - [`dlog`]: baby-step giant-step solver for hardness diagnostics
//! - [`agreement`]: ECDH and ElGamal over the generated groups
//! - [`salsa20`]: the session stream cipher
//!
//! The handshake that sequences these lives in the session crate; nothing
//! here touches the network.

pub mod agreement;
pub mod bigrand;
pub mod curve;
pub mod dlog;
pub mod error;
pub mod field;
pub mod hashes;
pub mod primality;
pub mod salsa20;

pub use agreement::{DomainParameters, EcdhReply, SessionKey};
pub use curve::{Curve, Point};
pub use error::CryptoError;
pub use salsa20::{Rounds, Salsa20};
