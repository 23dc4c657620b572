//! Digest helpers shared by key derivation and the handshake challenges

use md5::Md5;
use sha2::{Digest, Sha384};

/// SHA-384 digest, used to derive symmetric key material from curve points
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// MD5 digest, used only for the handshake convergence challenges.
///
/// The challenge confirms both peers derived the same parameters and key;
/// it is not a certificate or identity proof, so the weak digest is kept
/// for wire compatibility with existing peers.
pub fn md5(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}
