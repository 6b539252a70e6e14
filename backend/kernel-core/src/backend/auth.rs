//! SparkR backend authentication wire format.
//!
//! `SparkR:::connectBackend(host, port, timeout, authSecret)` authenticates
//! with SparkR's own string serialization, not protobuf:
//!
//! 1. Client sends the secret: big-endian `i32` length (bytes + 1), the UTF-8
//!    bytes, then a NUL
//! 2. Backend replies with a string in the same format: `"ok"` on success,
//!    `"err"` otherwise, closing the connection after `"err"`

use crate::error::frame::FrameError;

use common::ErrorLocation;

use std::panic::Location;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const AUTH_OK: &str = "ok";
pub const AUTH_ERR: &str = "err";

/// Largest secret string the backend reads before authenticating a peer.
pub const MAX_AUTH_STRING_LEN: usize = 1024;

/// Read one SparkR string of at most `max_len` bytes (including the NUL).
pub async fn read_string<R>(reader: &mut R, max_len: usize) -> Result<String, FrameError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_i32().await?;
    if len <= 0 {
        return Err(FrameError::Malformed {
            message: format!("SparkR string length must be positive, got {len}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let len = len as usize;
    if len > max_len {
        return Err(FrameError::TooLarge {
            message: format!("SparkR string of {len} bytes exceeds {max_len}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    buf.retain(|&b| b != 0);

    String::from_utf8(buf).map_err(|e| FrameError::Malformed {
        message: format!("SparkR string is not UTF-8: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Write `value` as a NUL-terminated SparkR string.
pub async fn write_string<W>(writer: &mut W, value: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let len = i32::try_from(value.len() + 1).map_err(|_| FrameError::TooLarge {
        message: format!("SparkR string of {} bytes does not fit an i32", value.len()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    writer.write_i32(len).await?;
    writer.write_all(value.as_bytes()).await?;
    writer.write_u8(0).await?;
    writer.flush().await?;
    Ok(())
}
