//! Textual wire formats for the handshake and the application frames.
//!
//! Handshake messages are parenthesized tuples of decimal integers,
//! `(a, b, c, p, gx, gy, agx, agy)` for the setup and `(bx, by)` for the
//! reply. Application plaintext travels as `<len>|<payload>` padded with
//! spaces up to the cipher block size, so every encrypted frame is a
//! whole number of blocks.

use num_bigint::BigUint;
use wildcurve_crypto::salsa20::BLOCK_SIZE;

use crate::error::HandshakeError;

/// Integer count of the setup tuple.
pub const SETUP_FIELDS: usize = 8;
/// Integer count of the reply tuple.
pub const REPLY_FIELDS: usize = 2;

/// Encodes a tuple of integers as `(v0, v1, ...)`.
pub fn encode_tuple(values: &[&BigUint]) -> Vec<u8> {
    let fields: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("({})", fields.join(", ")).into_bytes()
}

/// Parses a parenthesized tuple of exactly `expected` decimal integers.
///
/// Whitespace anywhere in the message is ignored; anything else outside
/// the digits, parentheses and separating commas is rejected.
pub fn parse_tuple(msg: &[u8], expected: usize) -> Result<Vec<BigUint>, HandshakeError> {
    let malformed = || HandshakeError::MalformedMessage { expected };

    let text = std::str::from_utf8(msg).map_err(|_| malformed())?;
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let inner = compact
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?;

    let fields: Vec<&str> = inner.split(',').collect();
    if fields.len() != expected {
        return Err(malformed());
    }

    fields
        .into_iter()
        .map(|field| {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            BigUint::parse_bytes(field.as_bytes(), 10).ok_or_else(malformed)
        })
        .collect()
}

/// Wraps plaintext as `<len>|<payload>`, space-padded to a multiple of
/// the cipher block size.
pub fn frame_plaintext(msg: &[u8]) -> Vec<u8> {
    let mut framed = format!("{}|", msg.len()).into_bytes();
    framed.extend_from_slice(msg);
    let tail = framed.len() % BLOCK_SIZE;
    if tail != 0 {
        framed.resize(framed.len() + BLOCK_SIZE - tail, b' ');
    }
    framed
}

/// Recovers the payload from a `<len>|<payload><padding>` frame.
pub fn unframe_plaintext(framed: &[u8]) -> Result<Vec<u8>, HandshakeError> {
    let split = framed
        .iter()
        .position(|&b| b == b'|')
        .ok_or(HandshakeError::MalformedFrame)?;
    let header =
        std::str::from_utf8(&framed[..split]).map_err(|_| HandshakeError::MalformedFrame)?;
    if header.is_empty() || !header.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HandshakeError::MalformedFrame);
    }
    let length: usize = header.parse().map_err(|_| HandshakeError::MalformedFrame)?;

    let payload = &framed[split + 1..];
    if length > payload.len() {
        return Err(HandshakeError::MalformedFrame);
    }
    Ok(payload[..length].to_vec())
}
