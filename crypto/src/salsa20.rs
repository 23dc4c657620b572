//! From-scratch Salsa20 stream cipher.
//!
//! Encryption and decryption are the same XOR against a keystream of
//! 64-byte blocks. Data may be fed in chunks, but every chunk except the
//! last must be an exact multiple of 64 bytes; the block counter advances
//! exactly once per block and is never replayed. Reusing a nonce under
//! the same key voids the security contract; nothing here enforces that.

use crate::error::{CryptoError, Result};

/// Keystream block size in bytes
pub const BLOCK_SIZE: usize = 64;

/// "expand 16-byte k" constants for 128-bit keys
const TAU: [u32; 4] = [0x6170_7865, 0x3120_646e, 0x7962_2d36, 0x6b20_6574];
/// "expand 32-byte k" constants for 256-bit keys
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Round-count variants of the cipher. Salsa20/8 and Salsa20/12 are the
/// reduced eSTREAM versions; 20 rounds is the original and the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rounds {
    Eight,
    Twelve,
    #[default]
    Twenty,
}

impl Rounds {
    pub fn from_count(count: u8) -> Result<Self> {
        match count {
            8 => Ok(Rounds::Eight),
            12 => Ok(Rounds::Twelve),
            20 => Ok(Rounds::Twenty),
            other => Err(CryptoError::InvalidRoundCount(other)),
        }
    }

    pub fn count(self) -> usize {
        match self {
            Rounds::Eight => 8,
            Rounds::Twelve => 12,
            Rounds::Twenty => 20,
        }
    }
}

/// Salsa20 cipher state: sixteen 32-bit words holding constants, key,
/// nonce, and the 64-bit little-endian block counter.
pub struct Salsa20 {
    state: [u32; 16],
    rounds: Rounds,
    last_chunk: usize,
}

impl Salsa20 {
    /// Initializes the cipher from a 16- or 32-byte key and an 8-byte
    /// nonce, with the block counter at zero.
    pub fn new(key: &[u8], nonce: &[u8; 8], rounds: Rounds) -> Result<Self> {
        let mut state = [0u32; 16];

        match key.len() {
            16 => {
                let k = words(key);
                state[0] = TAU[0];
                state[1..5].copy_from_slice(&k);
                state[5] = TAU[1];
                state[10] = TAU[2];
                state[11..15].copy_from_slice(&k);
                state[15] = TAU[3];
            }
            32 => {
                let k = words(&key[0..16]);
                state[0] = SIGMA[0];
                state[1..5].copy_from_slice(&k);
                state[5] = SIGMA[1];
                state[10] = SIGMA[2];
                state[11..15].copy_from_slice(&words(&key[16..32]));
                state[15] = SIGMA[3];
            }
            other => return Err(CryptoError::InvalidKeyLength(other)),
        }

        state[6] = u32::from_le_bytes([nonce[0], nonce[1], nonce[2], nonce[3]]);
        state[7] = u32::from_le_bytes([nonce[4], nonce[5], nonce[6], nonce[7]]);
        // state[8], state[9]: block counter, already zero

        Ok(Self {
            state,
            rounds,
            last_chunk: BLOCK_SIZE,
        })
    }

    /// XORs `data` against the keystream.
    ///
    /// Fails with `ProtocolMisuse` when a previous chunk ended short of a
    /// 64-byte boundary: only the final chunk of a message may be short.
    pub fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        if self.last_chunk != BLOCK_SIZE {
            return Err(CryptoError::ProtocolMisuse(
                "cipher fed more data after a short block",
            ));
        }

        let mut out = Vec::with_capacity(data.len());
        for chunk in data.chunks(BLOCK_SIZE) {
            let stream = self.keystream_block();
            self.advance_counter();
            out.extend(chunk.iter().zip(stream.iter()).map(|(d, s)| d ^ s));
            if chunk.len() < BLOCK_SIZE {
                self.last_chunk = chunk.len();
            }
        }
        Ok(out)
    }

    /// Identical to [`Salsa20::encrypt`]; XOR is its own inverse.
    pub fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.encrypt(data)
    }

    /// One 64-byte keystream block: the scrambled state added word-wise
    /// to the original state, serialized little-endian.
    fn keystream_block(&self) -> [u8; BLOCK_SIZE] {
        let mut x = self.state;
        for _ in (0..self.rounds.count()).step_by(2) {
            // column round
            quarter_round(&mut x, 0, 4, 8, 12);
            quarter_round(&mut x, 5, 9, 13, 1);
            quarter_round(&mut x, 10, 14, 2, 6);
            quarter_round(&mut x, 15, 3, 7, 11);
            // row round
            quarter_round(&mut x, 0, 1, 2, 3);
            quarter_round(&mut x, 5, 6, 7, 4);
            quarter_round(&mut x, 10, 11, 8, 9);
            quarter_round(&mut x, 15, 12, 13, 14);
        }

        let mut block = [0u8; BLOCK_SIZE];
        for (i, word) in x.iter().enumerate() {
            let sum = word.wrapping_add(self.state[i]);
            block[4 * i..4 * i + 4].copy_from_slice(&sum.to_le_bytes());
        }
        block
    }

    /// Advances the 64-bit block counter, carrying into the high word.
    fn advance_counter(&mut self) {
        self.state[8] = self.state[8].wrapping_add(1);
        if self.state[8] == 0 {
            self.state[9] = self.state[9].wrapping_add(1);
        }
    }
}

/// Add-rotate-xor quarter-round with the 7/9/13/18 rotation schedule.
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

fn words(bytes: &[u8]) -> [u32; 4] {
    let mut out = [0u32; 4];
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        out[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}
