//! # Remote Administration Wire Protocol
//!
//! Shared framing for the length-prefixed administration protocol spoken on a
//! game server's admin port. Both the client library and the local mock server
//! build on the types in this crate, so the byte layout lives in exactly one
//! place.
//!
//! ## Frame Layout
//!
//! Every packet on the wire is:
//!
//! ```text
//! int32 length (LE) | int32 request_id (LE) | int32 type (LE) | payload (UTF-8) | 0x00 0x00
//! ```
//!
//! `length` counts everything after the prefix itself, so the total frame is
//! always `4 + length` bytes. The payload never contains a NUL of its own.
//!
//! ## Phases
//!
//! The type field does not distinguish an authentication reply from a command
//! request (both use `2`). Which one a packet is follows from where the session
//! is: the first exchange on a connection is authentication, every later one is
//! a command.
//!
//! ## Usage Example
//!
//! ```rust
//! use rcon_protocol::{packet_type, Packet};
//!
//! let packet = Packet::new(1, packet_type::EXEC_COMMAND, "list");
//! let frame = packet.encode().unwrap();
//! assert_eq!(frame.len(), 4 + 10 + 4);
//!
//! let decoded = Packet::decode_body(&frame[4..]).unwrap();
//! assert_eq!(decoded, packet);
//! ```

use std::time::Duration;

mod codec;
mod error;

pub use codec::{read_packet, write_packet};
pub use error::FrameError;

/// Packet type values.
///
/// `AUTH_RESPONSE` and `EXEC_COMMAND` share a value; only the phase of the
/// exchange tells them apart.
pub mod packet_type {
    pub const AUTH: i32 = 3;
    pub const AUTH_RESPONSE: i32 = 2;
    pub const EXEC_COMMAND: i32 = 2;
    pub const RESPONSE_VALUE: i32 = 0;
}

/// Request id a server sends back when authentication is rejected.
pub const AUTH_FAILURE_ID: i32 = -1;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_RCON_PORT: u16 = 25575;
pub const DEFAULT_GAME_PORT: u16 = 25565;

/// Bound on connecting and on waiting for a reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Bound on the liveness check against the game port.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(1);

pub const MAX_PAYLOAD_LENGTH: usize = 4096;

const HEADER_LENGTH: usize = 8;
const PAD: [u8; 2] = [0, 0];

/// Smallest legal value of the length field: ids, type and the pad.
pub const MIN_FRAME_LENGTH: usize = HEADER_LENGTH + PAD.len();
/// Largest length field accepted from a peer.
pub const MAX_FRAME_LENGTH: usize = MIN_FRAME_LENGTH + MAX_PAYLOAD_LENGTH;

/// One unit of wire exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub packet_type: i32,
    pub payload: String,
}

impl Packet {
    pub fn new(request_id: i32, packet_type: i32, payload: impl Into<String>) -> Self {
        Self {
            request_id,
            packet_type,
            payload: payload.into(),
        }
    }

    /// Value of the length field this packet will carry on the wire.
    pub fn frame_length(&self) -> usize {
        MIN_FRAME_LENGTH + self.payload.len()
    }

    /// Serializes the packet into a complete frame, length prefix included.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let payload = self.payload.as_bytes();
        if payload.contains(&0) {
            return Err(FrameError::EmbeddedNul);
        }
        if payload.len() > MAX_PAYLOAD_LENGTH {
            return Err(FrameError::TooLong {
                len: payload.len(),
                max: MAX_PAYLOAD_LENGTH,
            });
        }

        let length = self.frame_length();
        let mut frame = Vec::with_capacity(4 + length);
        // Bounded by MAX_FRAME_LENGTH above, so the cast cannot truncate.
        frame.extend_from_slice(&(length as i32).to_le_bytes());
        frame.extend_from_slice(&self.request_id.to_le_bytes());
        frame.extend_from_slice(&self.packet_type.to_le_bytes());
        frame.extend_from_slice(payload);
        frame.extend_from_slice(&PAD);
        Ok(frame)
    }

    /// Parses the bytes that follow the length prefix.
    pub fn decode_body(body: &[u8]) -> Result<Self, FrameError> {
        if body.len() < MIN_FRAME_LENGTH {
            return Err(FrameError::Malformed(format!(
                "body of {} bytes is shorter than the {} byte minimum",
                body.len(),
                MIN_FRAME_LENGTH
            )));
        }

        let request_id = le_i32(&body[0..4]);
        let packet_type = le_i32(&body[4..8]);
        let (text, pad) = body[HEADER_LENGTH..].split_at(body.len() - HEADER_LENGTH - PAD.len());

        if pad != PAD {
            return Err(FrameError::Malformed(
                "payload is not terminated by two NUL bytes".to_string(),
            ));
        }
        if text.contains(&0) {
            return Err(FrameError::Malformed(
                "payload contains an embedded NUL byte".to_string(),
            ));
        }

        let payload = std::str::from_utf8(text)
            .map_err(|e| FrameError::Malformed(format!("payload is not valid UTF-8: {}", e)))?;

        Ok(Self {
            request_id,
            packet_type,
            payload: payload.to_string(),
        })
    }
}

fn le_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let packet = Packet::new(7, packet_type::AUTH, "pw");
        let frame = packet.encode().unwrap();

        assert_eq!(
            frame,
            vec![
                12, 0, 0, 0, // length
                7, 0, 0, 0, // request id
                3, 0, 0, 0, // type
                b'p', b'w', 0, 0,
            ]
        );
    }

    #[test]
    fn test_length_field_excludes_prefix() {
        for payload in ["", "stop", "lp user Steve permission set * true", "héllo wörld"] {
            let frame = Packet::new(1, packet_type::EXEC_COMMAND, payload)
                .encode()
                .unwrap();
            let length = le_i32(&frame[0..4]) as usize;

            assert_eq!(length, frame.len() - 4);
            assert_eq!(length, 8 + payload.len() + 2);
        }
    }

    #[test]
    fn test_negative_ids_encode_little_endian() {
        let frame = Packet::new(AUTH_FAILURE_ID, packet_type::AUTH_RESPONSE, "")
            .encode()
            .unwrap();
        assert_eq!(&frame[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_body() {
        let packet = Packet::new(42, packet_type::RESPONSE_VALUE, "Stopping the server");
        let frame = packet.encode().unwrap();

        let decoded = Packet::decode_body(&frame[4..]).unwrap();
        assert_eq!(decoded.request_id, 42);
        assert_eq!(decoded.packet_type, packet_type::RESPONSE_VALUE);
        assert_eq!(decoded.payload, "Stopping the server");
    }

    #[test]
    fn test_encode_decode_across_ids_types_and_payloads() {
        let payloads = vec![
            String::new(),
            "stop".to_string(),
            "lp user Steve permission set * true".to_string(),
            "héllo wörld".to_string(),
            "日本語のコマンド 🌍".to_string(),
            "line\nbreak\ttab\r\n".to_string(),
            "x".repeat(MAX_PAYLOAD_LENGTH),
            "é".repeat(MAX_PAYLOAD_LENGTH / 2),
            "🌍".repeat(MAX_PAYLOAD_LENGTH / 4),
        ];
        let ids = [i32::MIN, AUTH_FAILURE_ID, 0, 1, 2, 12345, i32::MAX];
        let kinds = [
            packet_type::AUTH,
            packet_type::EXEC_COMMAND,
            packet_type::RESPONSE_VALUE,
        ];

        for payload in &payloads {
            for &request_id in &ids {
                for &kind in &kinds {
                    let packet = Packet::new(request_id, kind, payload.as_str());
                    let frame = packet.encode().unwrap();

                    assert_eq!(le_i32(&frame[0..4]) as usize, frame.len() - 4);
                    assert_eq!(Packet::decode_body(&frame[4..]).unwrap(), packet);
                }
            }
        }
    }

    #[test]
    fn test_decode_empty_payload() {
        let body = [5, 0, 0, 0, 2, 0, 0, 0, 0, 0];
        let decoded = Packet::decode_body(&body).unwrap();
        assert_eq!(decoded.request_id, 5);
        assert_eq!(decoded.payload, "");
    }

    #[test]
    fn test_encode_rejects_embedded_nul() {
        let result = Packet::new(1, packet_type::EXEC_COMMAND, "say a\0b").encode();
        assert!(matches!(result, Err(FrameError::EmbeddedNul)));
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let payload = "x".repeat(MAX_PAYLOAD_LENGTH + 1);
        let result = Packet::new(1, packet_type::EXEC_COMMAND, payload).encode();
        assert!(matches!(result, Err(FrameError::TooLong { len, .. }) if len == MAX_PAYLOAD_LENGTH + 1));

        let payload = "x".repeat(MAX_PAYLOAD_LENGTH);
        assert!(Packet::new(1, packet_type::EXEC_COMMAND, payload).encode().is_ok());
    }

    #[test]
    fn test_decode_short_body() {
        let result = Packet::decode_body(&[1, 0, 0, 0, 0, 0]);
        assert!(matches!(result, Err(FrameError::Malformed(_))));
    }

    #[test]
    fn test_decode_missing_pad() {
        let body = [1, 0, 0, 0, 0, 0, 0, 0, b'o', b'k'];
        assert!(matches!(
            Packet::decode_body(&body),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let body = [1, 0, 0, 0, 0, 0, 0, 0, 0xC3, 0x28, 0, 0];
        assert!(matches!(
            Packet::decode_body(&body),
            Err(FrameError::Malformed(msg)) if msg.contains("UTF-8")
        ));
    }

    #[test]
    fn test_decode_embedded_nul() {
        let body = [1, 0, 0, 0, 0, 0, 0, 0, b'a', 0, b'b', 0, 0];
        assert!(matches!(
            Packet::decode_body(&body),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn test_shared_type_values() {
        assert_eq!(packet_type::AUTH, 3);
        assert_eq!(packet_type::AUTH_RESPONSE, packet_type::EXEC_COMMAND);
        assert_eq!(packet_type::RESPONSE_VALUE, 0);
    }
}
