use std::io;
use thiserror::Error;

/// Errors raised while framing or unframing packets.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed before a full packet arrived")]
    Closed,

    #[error("malformed packet: {0}")]
    Malformed(String),

    #[error("payload contains an embedded NUL byte")]
    EmbeddedNul,

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    TooLong { len: usize, max: usize },
}

impl FrameError {
    /// True when the error means the peer is gone rather than misbehaving.
    pub fn is_disconnect(&self) -> bool {
        match self {
            FrameError::Closed => true,
            FrameError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::NotConnected
            ),
            _ => false,
        }
    }
}
