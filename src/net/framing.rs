//! Length-prefixed frames on the peer stream
//!
//! Each frame is a little-endian `u32` byte count followed by that many bytes of
//! encoded `LinkMessage`. Frames are tiny, so a whole frame is written in one call.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::constants::net::MAX_MESSAGE_SIZE;

const PREFIX_LEN: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("peer closed the stream")]
    ConnectionClosed,
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    MessageTooLarge { len: usize, max: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// `read_exact`, with EOF mapped to `ConnectionClosed`
async fn fill<R: AsyncRead + Unpin>(stream: &mut R, buf: &mut [u8]) -> Result<(), FramingError> {
    stream.read_exact(buf).await.map(|_| ()).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FramingError::ConnectionClosed
        } else {
            FramingError::Io(e)
        }
    })
}

fn check_len(len: usize) -> Result<(), FramingError> {
    if len > MAX_MESSAGE_SIZE {
        return Err(FramingError::MessageTooLarge {
            len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

/// Read one frame's payload
pub async fn read_message<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>, FramingError> {
    let mut prefix = [0u8; PREFIX_LEN];
    fill(stream, &mut prefix).await?;

    let len = u32::from_le_bytes(prefix) as usize;
    check_len(len)?;

    let mut payload = vec![0u8; len];
    fill(stream, &mut payload).await?;
    Ok(payload)
}

/// Write one frame and flush it
pub async fn write_message<W: AsyncWrite + Unpin>(
    stream: &mut W,
    data: &[u8],
) -> Result<(), FramingError> {
    check_len(data.len())?;

    let mut frame = [0u8; PREFIX_LEN + MAX_MESSAGE_SIZE];
    frame[..PREFIX_LEN].copy_from_slice(&(data.len() as u32).to_le_bytes());
    frame[PREFIX_LEN..PREFIX_LEN + data.len()].copy_from_slice(data);

    stream.write_all(&frame[..PREFIX_LEN + data.len()]).await?;
    stream.flush().await?;
    Ok(())
}
