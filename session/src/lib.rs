//! Confidential channel over freshly generated elliptic curves.
//!
//! Every session negotiates its own group: the initiator manufactures a
//! pseudoprime field, a random nonsingular cubic over it and a generator,
//! then both sides run ECDH on that group, hash the shared point into
//! Salsa20 key material, and prove key agreement with encrypted digests
//! before any application traffic flows.
//!
//! ```text
//! initiator                                   responder
//! ---------                                   ---------
//! generate p, curve, G, a
//! (a, b, c, p, Gx, Gy, aGx, aGy)  -------->   sample b, S = b * aG
//!                                 <--------   (bGx, bGy)
//! S = a * bG, key = H(S)
//! E(md5(curve))                   -------->   key = H(S), verify digest
//!                                 <--------   E(md5(aG || bG))
//! verify digest
//! ready                                       ready
//! ```
//!
//! [`HandshakeSession`] is the sans-io state machine; [`SecureChannel`]
//! wraps it over any async byte stream with length-delimited framing.

pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod wire;

pub use config::SessionConfig;
pub use error::{HandshakeError, SessionError};
pub use session::{Advance, HandshakeSession, SessionState};
pub use transport::SecureChannel;
