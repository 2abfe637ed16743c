//! Async framing over any byte stream.

use crate::{FrameError, Packet, MAX_FRAME_LENGTH, MIN_FRAME_LENGTH};
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one complete packet.
///
/// A single `read` may return only part of a frame, so both the length prefix
/// and the body are accumulated until exactly the advertised number of bytes
/// has arrived. EOF at any point before that yields [`FrameError::Closed`].
pub async fn read_packet<R>(reader: &mut R) -> Result<Packet, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    fill(reader, &mut prefix).await?;

    let length = i32::from_le_bytes(prefix);
    if length < MIN_FRAME_LENGTH as i32 || length > MAX_FRAME_LENGTH as i32 {
        return Err(FrameError::Malformed(format!(
            "length field {} outside {}..={}",
            length, MIN_FRAME_LENGTH, MAX_FRAME_LENGTH
        )));
    }

    let mut body = vec![0u8; length as usize];
    fill(reader, &mut body).await?;
    trace!("Read frame of {} bytes", length);

    Packet::decode_body(&body)
}

/// Encodes and writes one packet, then flushes.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let frame = packet.encode()?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    trace!(
        "Wrote frame {} (type {}, {} bytes)",
        packet.request_id,
        packet.packet_type,
        frame.len()
    );
    Ok(())
}

async fn fill<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(FrameError::Closed);
        }
        filled += n;
    }
    Ok(())
}
