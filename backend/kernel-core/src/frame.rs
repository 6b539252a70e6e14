//! Length-prefixed protobuf frames.
//!
//! Each frame is a big-endian `u32` byte count followed by one encoded
//! message. Used both by the backend accept loop and by [`TcpKernelClient`].
//!
//! [`TcpKernelClient`]: crate::kernel_client::tcp::TcpKernelClient

use crate::error::frame::FrameError;

use common::ErrorLocation;

use std::panic::Location;

use prost::Message as ProstMessage;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

pub async fn write_frame<W, M>(writer: &mut W, message: &M) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    M: ProstMessage,
{
    let len = message.encoded_len();
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge {
            message: format!("Outgoing frame of {len} bytes exceeds {MAX_FRAME_LEN}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut buf = Vec::with_capacity(len);
    message.encode(&mut buf)?;

    writer.write_u32(len as u32).await?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R, M>(reader: &mut R) -> Result<M, FrameError>
where
    R: AsyncRead + Unpin,
    M: ProstMessage + Default,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge {
            message: format!("Incoming frame of {len} bytes exceeds {MAX_FRAME_LEN}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(M::decode(&buf[..])?)
}
