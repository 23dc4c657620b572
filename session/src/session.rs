//! The handshake state machine.
//!
//! One [`HandshakeSession`] drives one confidential channel from either
//! end. An initiator calls [`HandshakeSession::initiate`] and sends the
//! setup message; from then on both sides feed every inbound message to
//! [`HandshakeSession::advance`] and transmit whatever it hands back.
//! Any protocol failure is terminal: the session drops into
//! [`SessionState::Error`] and refuses all further traffic.

use std::fmt;

use num_bigint::BigUint;
use wildcurve_crypto::{agreement, hashes, Curve, CryptoError, Point, Salsa20};

use crate::config::SessionConfig;
use crate::error::{HandshakeError, Result};
use crate::wire;

/// Progress of the handshake, named from each side's own perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Fresh session; may initiate, or become the responder on the
    /// first inbound message.
    SetupNeeded,
    /// Initiator: setup sent, waiting for the reply point.
    Sent,
    /// Responder: reply sent, waiting for the encrypted challenge.
    ReceivedReplied,
    /// Initiator: key derived and challenge sent, waiting for the
    /// counter-challenge.
    ReplyReceivedAccepted,
    /// Handshake complete, application traffic flows.
    Ready,
    /// Terminal failure.
    Error,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::SetupNeeded => "setup-needed",
            SessionState::Sent => "sent",
            SessionState::ReceivedReplied => "received-replied",
            SessionState::ReplyReceivedAccepted => "reply-received-accepted",
            SessionState::Ready => "ready",
            SessionState::Error => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of feeding one inbound message to the session.
#[derive(Debug)]
pub enum Advance {
    /// Handshake continues; transmit this message to the peer.
    Reply(Vec<u8>),
    /// Handshake complete, with an optional final message to transmit.
    Established(Option<Vec<u8>>),
    /// Decrypted application payload.
    Inbound(Vec<u8>),
}

/// Handshake and traffic state for one channel endpoint.
pub struct HandshakeSession {
    config: SessionConfig,
    state: SessionState,
    curve: Option<Curve>,
    own_scalar: Option<BigUint>,
    initiator_public: Option<Point>,
    responder_public: Option<Point>,
    shared_secret: Option<Point>,
    cipher: Option<Salsa20>,
}

impl HandshakeSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::SetupNeeded,
            curve: None,
            own_scalar: None,
            initiator_public: None,
            responder_public: None,
            shared_secret: None,
            cipher: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Generates fresh domain parameters and produces the setup message,
    /// making this side the initiator.
    pub fn initiate(&mut self) -> Result<Vec<u8>> {
        if self.state != SessionState::SetupNeeded {
            return Err(HandshakeError::InvalidState.into());
        }

        let params = agreement::ecdh_init(self.config.prime_bytes, self.config.primality_rounds);
        let (gx, gy) = affine(&params.generator)?;
        let (ax, ay) = affine(&params.public_point)?;
        let setup = wire::encode_tuple(&[
            params.curve.a(),
            params.curve.b(),
            params.curve.c(),
            params.curve.p(),
            gx,
            gy,
            ax,
            ay,
        ]);
        if self.config.verbose_logging {
            tracing::debug!(curve = %params.curve, "proposing session parameters");
        }

        self.curve = Some(params.curve);
        self.own_scalar = Some(params.private_scalar);
        self.initiator_public = Some(params.public_point);
        self.state = SessionState::Sent;
        Ok(setup)
    }

    /// Processes one inbound message according to the current state.
    ///
    /// Any error is terminal: the session moves to `Error` and every
    /// later call fails with `InvalidState`.
    pub fn advance(&mut self, msg: &[u8]) -> Result<Advance> {
        let step = match self.state {
            SessionState::SetupNeeded => self.handle_setup(msg),
            SessionState::Sent => self.handle_reply(msg),
            SessionState::ReceivedReplied => self.handle_initiator_challenge(msg),
            SessionState::ReplyReceivedAccepted => self.handle_responder_challenge(msg),
            SessionState::Ready => self.handle_application(msg),
            SessionState::Error => return Err(HandshakeError::InvalidState.into()),
        };
        match step {
            Ok(advance) => Ok(advance),
            Err(err) => {
                tracing::warn!(state = %self.state, error = %err, "session failed");
                self.state = SessionState::Error;
                Err(err)
            }
        }
    }

    /// Encrypts an application message for the peer. Only valid once the
    /// handshake has completed.
    pub fn encrypt_message(&mut self, msg: &[u8]) -> Result<Vec<u8>> {
        if self.state != SessionState::Ready {
            return Err(HandshakeError::InvalidState.into());
        }
        self.encrypt_payload(msg)
    }

    /// Responder: the setup tuple arrived. Adopt the proposed group,
    /// sample an own keypair and answer with the reply point.
    fn handle_setup(&mut self, msg: &[u8]) -> Result<Advance> {
        let fields = wire::parse_tuple(msg, wire::SETUP_FIELDS)?;
        let Ok([a, b, c, p, gx, gy, agx, agy]) = <[BigUint; 8]>::try_from(fields) else {
            return Err(HandshakeError::MalformedMessage {
                expected: wire::SETUP_FIELDS,
            }
            .into());
        };

        let curve = Curve::new(a, b, c, p)?;
        let generator = curve.point(gx, gy);
        // peer coordinates are taken at face value; see ecdh_reply
        let peer_public = curve.point(agx, agy);

        let reply = agreement::ecdh_reply(&curve, &generator, &peer_public);
        let (bx, by) = affine(&reply.public_point)?;
        let out = wire::encode_tuple(&[bx, by]);
        if self.config.verbose_logging {
            tracing::debug!(%curve, %generator, "accepted session parameters");
        }

        self.curve = Some(curve);
        self.initiator_public = Some(peer_public);
        self.responder_public = Some(reply.public_point.clone());
        self.shared_secret = Some(reply.shared_secret);
        self.state = SessionState::ReceivedReplied;
        Ok(Advance::Reply(out))
    }

    /// Initiator: the reply point arrived. Derive the session key and
    /// send the curve-digest challenge under it.
    fn handle_reply(&mut self, msg: &[u8]) -> Result<Advance> {
        let fields = wire::parse_tuple(msg, wire::REPLY_FIELDS)?;
        let Ok([bx, by]) = <[BigUint; 2]>::try_from(fields) else {
            return Err(HandshakeError::MalformedMessage {
                expected: wire::REPLY_FIELDS,
            }
            .into());
        };

        let (peer_public, secret, key, challenge) = {
            let curve = self.curve.as_ref().ok_or(HandshakeError::InvalidState)?;
            let scalar = self
                .own_scalar
                .as_ref()
                .ok_or(HandshakeError::InvalidState)?;
            let peer_public = curve.point(bx, by);
            let (secret, key) = agreement::ecdh_accept(curve, scalar, &peer_public);
            let challenge = hashes::md5(curve.to_string().as_bytes());
            (peer_public, secret, key, challenge)
        };

        self.cipher = Some(Salsa20::new(&key.key, &key.nonce, self.config.cipher_rounds)?);
        self.responder_public = Some(peer_public);
        self.shared_secret = Some(secret);

        let out = self.encrypt_payload(&challenge)?;
        self.state = SessionState::ReplyReceivedAccepted;
        Ok(Advance::Reply(out))
    }

    /// Responder: the encrypted curve digest arrived. Derive the key,
    /// verify the digest, confirm with the transcript digest.
    fn handle_initiator_challenge(&mut self, msg: &[u8]) -> Result<Advance> {
        let key = agreement::derive_key(
            self.shared_secret
                .as_ref()
                .ok_or(HandshakeError::InvalidState)?,
        );
        self.cipher = Some(Salsa20::new(&key.key, &key.nonce, self.config.cipher_rounds)?);

        let plaintext = self.decrypt_payload(msg)?;
        let curve = self.curve.as_ref().ok_or(HandshakeError::InvalidState)?;
        let expected = hashes::md5(curve.to_string().as_bytes());
        if plaintext != expected {
            return Err(HandshakeError::AuthenticationMismatch.into());
        }

        let confirmation = self.transcript_digest()?;
        let out = self.encrypt_payload(&confirmation)?;
        self.state = SessionState::Ready;
        if self.config.verbose_logging {
            tracing::debug!("responder handshake complete");
        }
        Ok(Advance::Established(Some(out)))
    }

    /// Initiator: the encrypted transcript digest arrived; verify it.
    fn handle_responder_challenge(&mut self, msg: &[u8]) -> Result<Advance> {
        let plaintext = self.decrypt_payload(msg)?;
        let expected = self.transcript_digest()?;
        if plaintext != expected {
            return Err(HandshakeError::AuthenticationMismatch.into());
        }
        self.state = SessionState::Ready;
        if self.config.verbose_logging {
            tracing::debug!("initiator handshake complete");
        }
        Ok(Advance::Established(None))
    }

    fn handle_application(&mut self, msg: &[u8]) -> Result<Advance> {
        Ok(Advance::Inbound(self.decrypt_payload(msg)?))
    }

    /// MD5 over the initiator and responder public points, in that order.
    fn transcript_digest(&self) -> Result<[u8; 16]> {
        let initiator = self
            .initiator_public
            .as_ref()
            .ok_or(HandshakeError::InvalidState)?;
        let responder = self
            .responder_public
            .as_ref()
            .ok_or(HandshakeError::InvalidState)?;
        Ok(hashes::md5(format!("{}{}", initiator, responder).as_bytes()))
    }

    fn encrypt_payload(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let framed = wire::frame_plaintext(plaintext);
        let cipher = self.cipher.as_mut().ok_or(HandshakeError::InvalidState)?;
        Ok(cipher.encrypt(&framed)?)
    }

    fn decrypt_payload(&mut self, msg: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.cipher.as_mut().ok_or(HandshakeError::InvalidState)?;
        let framed = cipher.decrypt(msg)?;
        Ok(wire::unframe_plaintext(&framed)?)
    }
}

fn affine(pt: &Point) -> Result<(&BigUint, &BigUint)> {
    pt.coordinates()
        .ok_or_else(|| CryptoError::ProtocolMisuse("identity point cannot cross the wire").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;

    fn config() -> SessionConfig {
        SessionConfig::new().with_prime_bytes(1)
    }

    #[test]
    fn fresh_session_needs_setup() {
        let session = HandshakeSession::new(config());
        assert_eq!(session.state(), SessionState::SetupNeeded);
        assert!(!session.is_ready());
    }

    #[test]
    fn initiate_produces_an_eight_field_tuple() {
        let mut session = HandshakeSession::new(config());
        let setup = session.initiate().unwrap();
        assert_eq!(session.state(), SessionState::Sent);

        let fields = wire::parse_tuple(&setup, wire::SETUP_FIELDS).unwrap();
        // the proposed group must be constructible and hold both points
        let curve = Curve::new(
            fields[0].clone(),
            fields[1].clone(),
            fields[2].clone(),
            fields[3].clone(),
        )
        .unwrap();
        assert!(curve.contains(&curve.point(fields[4].clone(), fields[5].clone())));
        assert!(curve.contains(&curve.point(fields[6].clone(), fields[7].clone())));
    }

    #[test]
    fn initiate_twice_is_rejected() {
        let mut session = HandshakeSession::new(config());
        session.initiate().unwrap();
        assert!(matches!(
            session.initiate(),
            Err(SessionError::Handshake(HandshakeError::InvalidState))
        ));
        // misuse does not poison the session
        assert_eq!(session.state(), SessionState::Sent);
    }

    #[test]
    fn malformed_setup_is_terminal() {
        let mut session = HandshakeSession::new(config());
        let err = session.advance(b"(1, 2, 3)").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Handshake(HandshakeError::MalformedMessage { expected: 8 })
        ));
        assert_eq!(session.state(), SessionState::Error);

        // every later message is refused
        assert!(matches!(
            session.advance(b"(1, 2, 3, 4, 5, 6, 7, 8)"),
            Err(SessionError::Handshake(HandshakeError::InvalidState))
        ));
    }

    #[test]
    fn singular_curve_proposal_is_terminal() {
        // x^3 + 28x + 2 over F_31 has vanishing discriminant
        let mut session = HandshakeSession::new(config());
        let err = session
            .advance(b"(0, 28, 2, 31, 0, 6, 0, 6)")
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Crypto(CryptoError::InvalidCurve)
        ));
        assert_eq!(session.state(), SessionState::Error);
    }

    #[test]
    fn tiny_modulus_proposal_is_terminal() {
        let mut session = HandshakeSession::new(config());
        assert!(session.advance(b"(1, 1, 1, 3, 0, 1, 0, 1)").is_err());
        assert_eq!(session.state(), SessionState::Error);
    }

    #[test]
    fn tiny_prime_setup_is_answered() {
        // y^2 = x^3 + x + 1 over F_5 is nonsingular and holds (0, 1);
        // the responder must answer rather than stall on scalar sampling
        let mut session = HandshakeSession::new(config());
        let advance = session.advance(b"(0, 1, 1, 5, 0, 1, 0, 4)").unwrap();
        let Advance::Reply(msg) = advance else {
            panic!("expected a reply point");
        };
        assert_eq!(session.state(), SessionState::ReceivedReplied);
        assert_eq!(wire::parse_tuple(&msg, wire::REPLY_FIELDS).unwrap().len(), 2);
    }

    #[test]
    fn encrypt_before_ready_is_rejected() {
        let mut session = HandshakeSession::new(config());
        assert!(matches!(
            session.encrypt_message(b"too soon"),
            Err(SessionError::Handshake(HandshakeError::InvalidState))
        ));
    }
}
