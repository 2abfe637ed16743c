//! Client side of the remote administration protocol.

use crate::error::{CommandError, ConnectError};
use log::{debug, trace};
use rcon_protocol::{
    packet_type, read_packet, FrameError, Packet, AUTH_FAILURE_ID, DEFAULT_TIMEOUT,
};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

/// Where a session is in its lifecycle.
///
/// `Connected` covers both a freshly opened stream and one whose
/// authentication is pending. Any failure during connect or authentication
/// goes straight to `Closed`; nothing partial is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Ready,
    Closed,
}

/// One administrative session over a single byte stream.
///
/// The client owns its stream exclusively and keeps exactly one request in
/// flight: every packet sent is followed by reading its reply (or failing)
/// before anything else is written. Dropping the client releases the stream,
/// so an early return never leaks a socket.
pub struct RconClient<S = TcpStream> {
    stream: Option<S>,
    request_id: i32,
    state: SessionState,
    timeout: Duration,
}

impl RconClient<TcpStream> {
    /// Opens a session with the default five second bound.
    pub async fn connect(host: &str, port: u16, password: &str) -> Result<Self, ConnectError> {
        Self::connect_timeout(host, port, password, DEFAULT_TIMEOUT).await
    }

    /// Opens a TCP stream, then authenticates over it.
    ///
    /// `timeout` bounds the connect and every later wait for a reply.
    pub async fn connect_timeout(
        host: &str,
        port: u16,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, ConnectError> {
        debug!("Connecting to {}:{}", host, port);

        let stream = match time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(result) => result.map_err(ConnectError::Network)?,
            Err(_) => {
                return Err(ConnectError::Network(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {}:{} timed out after {:?}", host, port, timeout),
                )))
            }
        };

        let mut client = Self::from_stream(stream, timeout);
        client.authenticate(password).await?;
        Ok(client)
    }
}

impl<S> RconClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already open stream. The session starts unauthenticated.
    pub fn from_stream(stream: S, timeout: Duration) -> Self {
        RconClient {
            stream: Some(stream),
            request_id: 0,
            state: SessionState::Connected,
            timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs the authentication exchange.
    ///
    /// Succeeds when a reply arrives whose request id is anything other than
    /// the `-1` sentinel. A reply that never arrives counts as a rejection.
    /// On failure the stream is dropped.
    pub async fn authenticate(&mut self, password: &str) -> Result<(), ConnectError> {
        match self.state {
            SessionState::Ready => return Ok(()),
            SessionState::Closed => return Err(ConnectError::ConnectionClosed),
            SessionState::Connected => {}
        }

        let request = Packet::new(self.next_request_id(), packet_type::AUTH, password);
        let frame = match request.encode() {
            Ok(frame) => frame,
            Err(e) => {
                self.abandon();
                return Err(ConnectError::InvalidPassword(e));
            }
        };

        match self.exchange(&frame).await {
            Ok(Some(reply)) if reply.request_id == AUTH_FAILURE_ID => {
                debug!("Authentication rejected");
                self.abandon();
                Err(ConnectError::AuthenticationFailed)
            }
            Ok(Some(reply)) => {
                debug!("Authenticated (request {})", reply.request_id);
                self.state = SessionState::Ready;
                Ok(())
            }
            Ok(None) => {
                debug!("No authentication reply within {:?}", self.timeout);
                self.abandon();
                Err(ConnectError::AuthenticationFailed)
            }
            Err(e) => {
                self.abandon();
                Err(e.into())
            }
        }
    }

    /// Sends one command and returns the text of the single reply.
    ///
    /// The reply's type tag is not checked and its request id is advisory.
    /// After a timeout, a closed peer or a malformed reply the stream can no
    /// longer be trusted to be in step, so the session is closed.
    pub async fn execute(&mut self, command: &str) -> Result<String, CommandError> {
        match self.state {
            SessionState::Connected => return Err(CommandError::NotAuthenticated),
            SessionState::Closed => return Err(CommandError::ConnectionClosed),
            SessionState::Ready => {}
        }

        let request = Packet::new(self.next_request_id(), packet_type::EXEC_COMMAND, command);
        let frame = request.encode().map_err(CommandError::InvalidCommand)?;

        match self.exchange(&frame).await {
            Ok(Some(reply)) => {
                if reply.request_id != request.request_id {
                    debug!(
                        "Reply id {} does not match request {}",
                        reply.request_id, request.request_id
                    );
                }
                Ok(reply.payload)
            }
            Ok(None) => {
                self.abandon();
                Err(CommandError::Timeout(self.timeout))
            }
            Err(e) => {
                self.abandon();
                Err(e.into())
            }
        }
    }

    /// Shuts the stream down. Calling this on a closed session does nothing.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                trace!("Shutdown after close: {}", e);
            }
            debug!("Session closed");
        }
        self.state = SessionState::Closed;
    }

    /// Writes one frame and waits for one reply. `Ok(None)` means the wait
    /// ran out before a full packet arrived.
    async fn exchange(&mut self, frame: &[u8]) -> Result<Option<Packet>, FrameError> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(FrameError::Closed)?;

        match time::timeout(timeout, round_trip(stream, frame)).await {
            Ok(reply) => reply.map(Some),
            Err(_) => Ok(None),
        }
    }

    fn next_request_id(&mut self) -> i32 {
        // Never reaches the failure sentinel.
        self.request_id = self.request_id.checked_add(1).unwrap_or(1);
        self.request_id
    }

    fn abandon(&mut self) {
        self.stream = None;
        self.state = SessionState::Closed;
    }
}

async fn round_trip<S>(stream: &mut S, frame: &[u8]) -> Result<Packet, FrameError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(frame).await?;
    stream.flush().await?;
    trace!("Sent {} bytes, awaiting reply", frame.len());
    read_packet(stream).await
}
