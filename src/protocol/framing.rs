//! Length-prefixed message framing

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::amf::amf0;
use crate::error::ProtocolError;

use super::constants::LENGTH_PREFIX_SIZE;
use super::message::{Message, RawMessage};

/// Encode a message with its length prefix
pub fn encode_message(msg: &Message, max_size: usize) -> Result<Bytes, ProtocolError> {
    let body = amf0::encode_all(&msg.to_amf());
    if body.len() > max_size {
        return Err(ProtocolError::MessageTooLarge {
            size: body.len(),
            max: max_size,
        });
    }

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + body.len());
    buf.put_u32(body.len() as u32);
    buf.put(body);
    Ok(buf.freeze())
}

/// Encode and write a single message
pub async fn write_message<W>(writer: &mut W, msg: &Message, max_size: usize) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encode_message(msg, max_size).map_err(invalid_data)?;
    writer.write_all(&bytes).await
}

/// Read a single message
///
/// Returns `Ok(None)` on a clean end of stream between messages.
pub async fn read_message<R>(reader: &mut R, max_size: usize) -> io::Result<Option<RawMessage>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let size = u32::from_be_bytes(prefix) as usize;
    if size > max_size {
        return Err(invalid_data(ProtocolError::MessageTooLarge {
            size,
            max: max_size,
        }));
    }

    let mut body = vec![0u8; size];
    reader.read_exact(&mut body).await?;

    let values = amf0::decode_all(&body).map_err(|e| invalid_data(ProtocolError::from(e)))?;
    RawMessage::try_from(values).map(Some).map_err(invalid_data)
}

fn invalid_data(err: ProtocolError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
