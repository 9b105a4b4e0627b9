//! Length-prefixed framing.
//!
//! Every message on the wire is a two-byte big-endian length followed by
//! exactly that many bytes of body:
//!
//! ```text
//! +--------+--------+------------------------------+
//! | len_hi | len_lo |  body (len bytes, UTF-8 JSON) |
//! +--------+--------+------------------------------+
//! ```
//!
//! The prefix caps a body at 65535 bytes. Inbound frames are held to a much
//! smaller application cap ([`MAX_FRAME_LEN`]) so a peer can't make us
//! allocate large buffers.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::TransportError;

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 2;

/// Largest inbound body the server accepts.
pub const MAX_FRAME_LEN: usize = 4096;

/// Largest body the prefix can describe.
pub const MAX_ENCODABLE_LEN: usize = u16::MAX as usize;

/// Prefixes `body` with its length.
///
/// # Errors
/// Returns [`TransportError::InvalidFrame`] for an empty body or one that
/// does not fit in the two-byte prefix.
pub fn encode_frame(body: &[u8]) -> Result<Vec<u8>, TransportError> {
    if body.is_empty() || body.len() > MAX_ENCODABLE_LEN {
        return Err(TransportError::InvalidFrame {
            len: body.len(),
            max: MAX_ENCODABLE_LEN,
        });
    }
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&(body.len() as u16).to_be_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Reads one frame body from `reader`.
///
/// Returns `Ok(None)` if the stream ends cleanly before the first prefix
/// byte. A stream that ends anywhere else is reported as
/// [`TransportError::ConnectionClosed`].
pub async fn read_frame<R>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let first = reader
        .read(&mut header[..1])
        .await
        .map_err(TransportError::ReceiveFailed)?;
    if first == 0 {
        return Ok(None);
    }
    read_exact_or_closed(reader, &mut header[1..], "length prefix").await?;

    let len = u16::from_be_bytes(header) as usize;
    if len == 0 || len > max_len {
        return Err(TransportError::InvalidFrame { len, max: max_len });
    }

    let mut body = vec![0u8; len];
    read_exact_or_closed(reader, &mut body, "frame body").await?;
    Ok(Some(body))
}

/// Writes `body` as one frame and flushes the writer.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(body)?;
    writer
        .write_all(&frame)
        .await
        .map_err(TransportError::SendFailed)?;
    writer.flush().await.map_err(TransportError::SendFailed)
}

async fn read_exact_or_closed<R>(
    reader: &mut R,
    buf: &mut [u8],
    what: &str,
) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(
            TransportError::ConnectionClosed(format!("peer closed mid {what}")),
        ),
        Err(e) => Err(TransportError::ReceiveFailed(e)),
    }
}
