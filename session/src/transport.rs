//! Async framed transport for a confidential channel.
//!
//! Wire messages are length-delimited frames over any `AsyncRead +
//! AsyncWrite` stream. [`SecureChannel::connect`] and
//! [`SecureChannel::accept`] run the full handshake under the configured
//! deadline and hand back a channel ready for application traffic.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::config::SessionConfig;
use crate::error::{HandshakeError, Result, SessionError};
use crate::session::{Advance, HandshakeSession, SessionState};

/// An established (or establishing) confidential channel over `S`.
pub struct SecureChannel<S> {
    framed: Framed<S, LengthDelimitedCodec>,
    session: HandshakeSession,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SecureChannel<S> {
    /// Runs the initiator handshake over `socket`, generating fresh
    /// domain parameters. Fails with [`SessionError::Timeout`] when the
    /// configured deadline expires first.
    pub async fn connect(config: SessionConfig, socket: S) -> Result<Self> {
        let deadline = config.handshake_timeout;
        timeout(deadline, Self::handshake(config, socket, true))
            .await
            .map_err(|_| SessionError::Timeout)?
    }

    /// Runs the responder handshake over `socket`.
    pub async fn accept(config: SessionConfig, socket: S) -> Result<Self> {
        let deadline = config.handshake_timeout;
        timeout(deadline, Self::handshake(config, socket, false))
            .await
            .map_err(|_| SessionError::Timeout)?
    }

    async fn handshake(config: SessionConfig, socket: S, initiator: bool) -> Result<Self> {
        let mut framed = Framed::new(socket, LengthDelimitedCodec::new());
        let mut session = HandshakeSession::new(config);

        if initiator {
            let setup = session.initiate()?;
            framed.send(Bytes::from(setup)).await?;
        }

        while !session.is_ready() {
            let frame = framed
                .next()
                .await
                .ok_or(HandshakeError::ConnectionClosed)??;
            match session.advance(&frame)? {
                Advance::Reply(reply) => framed.send(Bytes::from(reply)).await?,
                Advance::Established(Some(reply)) => framed.send(Bytes::from(reply)).await?,
                Advance::Established(None) => {}
                // the peer must not send traffic before we confirm
                Advance::Inbound(_) => return Err(HandshakeError::InvalidState.into()),
            }
        }

        Ok(Self { framed, session })
    }

    /// Encrypts and transmits one application message.
    pub async fn send(&mut self, msg: &[u8]) -> Result<()> {
        let ciphertext = self.session.encrypt_message(msg)?;
        self.framed.send(Bytes::from(ciphertext)).await?;
        Ok(())
    }

    /// Receives and decrypts one application message. `None` means the
    /// peer closed the connection cleanly.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        match self.framed.next().await {
            None => Ok(None),
            Some(frame) => match self.session.advance(&frame?)? {
                Advance::Inbound(plaintext) => Ok(Some(plaintext)),
                _ => Err(HandshakeError::InvalidState.into()),
            },
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Tears the channel down, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }
}
