//! Session configuration.

use std::time::Duration;

use wildcurve_crypto::Rounds;

/// Tunables for one confidential channel.
///
/// The defaults mirror the protocol's reference parameters: 16-bit
/// session primes, 20 Miller-Rabin rounds, Salsa20/20.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Byte width of the generated session prime.
    pub prime_bytes: usize,
    /// Miller-Rabin witness rounds for prime generation.
    pub primality_rounds: u32,
    /// Stream-cipher round count.
    pub cipher_rounds: Rounds,
    /// Deadline for the whole handshake, parameter generation included.
    pub handshake_timeout: Duration,
    /// Log handshake internals (curve, points, state transitions) at
    /// debug level. Off by default; the values are key material.
    pub verbose_logging: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prime_bytes: 2,
            primality_rounds: 20,
            cipher_rounds: Rounds::Twenty,
            handshake_timeout: Duration::from_secs(30),
            verbose_logging: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prime_bytes(mut self, prime_bytes: usize) -> Self {
        self.prime_bytes = prime_bytes;
        self
    }

    pub fn with_primality_rounds(mut self, rounds: u32) -> Self {
        self.primality_rounds = rounds;
        self
    }

    pub fn with_cipher_rounds(mut self, rounds: Rounds) -> Self {
        self.cipher_rounds = rounds;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }
}
