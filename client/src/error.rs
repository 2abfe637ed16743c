use rcon_protocol::FrameError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures while opening and authenticating a session.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("network error: {0}")]
    Network(#[source] io::Error),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("connection closed during authentication")]
    ConnectionClosed,

    #[error("malformed authentication reply: {0}")]
    Malformed(String),

    #[error("password cannot be sent: {0}")]
    InvalidPassword(#[source] FrameError),
}

/// Failures of a single command exchange.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("session is not authenticated")]
    NotAuthenticated,

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("command cannot be sent: {0}")]
    InvalidCommand(#[source] FrameError),

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<FrameError> for ConnectError {
    /// Only a clean EOF is `ConnectionClosed`; resets and other socket
    /// failures during login are `Network`.
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Closed => ConnectError::ConnectionClosed,
            FrameError::Io(e) => ConnectError::Network(e),
            FrameError::Malformed(msg) => ConnectError::Malformed(msg),
            other => ConnectError::InvalidPassword(other),
        }
    }
}

impl From<FrameError> for CommandError {
    fn from(err: FrameError) -> Self {
        if err.is_disconnect() {
            return CommandError::ConnectionClosed;
        }
        match err {
            FrameError::Io(e) => CommandError::Io(e),
            FrameError::Malformed(msg) => CommandError::Malformed(msg),
            other => CommandError::InvalidCommand(other),
        }
    }
}
