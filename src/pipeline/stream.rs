//! Streaming transport: length-prefixed frames in, one text reply per line out.
//!
//! Each frame is a big-endian `u32` byte count followed by that many bytes.
//! A zero count is a valid (empty) frame and is answered with `[Error]`.
//! End of input between frames ends the session cleanly.

use crate::constants::MAX_FRAME_BYTES;
use crate::error::{Error, Result};
use crate::pipeline::SignPipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Serve frames from `reader` until it closes, writing one reply line each.
///
/// Returns the number of frames answered.
///
/// # Errors
///
/// Returns an error if a length prefix exceeds the frame limit, a frame is
/// truncated, or either side of the transport fails.
pub async fn serve_stream<R, W>(
    pipeline: Arc<SignPipeline>,
    mut reader: R,
    mut writer: W,
    timeout: Duration,
) -> Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frames = 0usize;

    loop {
        let len = match reader.read_u32().await {
            Ok(len) => len,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        if len > MAX_FRAME_BYTES {
            return Err(Error::InvalidRequest {
                message: format!("frame of {len} bytes exceeds limit of {MAX_FRAME_BYTES}"),
            });
        }

        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::InvalidRequest {
                    message: format!("stream ended inside a {len}-byte frame"),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let outcome = pipeline.classify_with_timeout(buf, timeout).await;
        writer.write_all(outcome.label().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        frames += 1;
        debug!(frame = frames, reply = outcome.label(), "Replied");
    }

    info!("Stream closed after {} frames", frames);
    Ok(frames)
}
