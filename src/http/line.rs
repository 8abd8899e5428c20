use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// HTTP/1.0 line terminator.
pub const EOL: &[u8; 2] = b"\r\n";

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("peer closed the connection after {received} bytes without a line terminator")]
    Closed { received: usize },
    #[error("no line terminator within {limit} bytes")]
    TooLong { limit: usize },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one CRLF-terminated line into `buf`.
///
/// At most `limit` bytes are consumed from `reader`, terminator included, so a
/// successful line is between `0` and `limit - 2` bytes long. The terminator
/// is stripped. Bytes after the terminator are left unread.
///
/// On a byte that breaks a partial match the matcher restarts from that byte,
/// so `\r\r\n` still ends the line.
pub async fn read_line<R>(reader: &mut R, buf: &mut BytesMut, limit: usize) -> Result<usize, LineError>
where
    R: AsyncRead + Unpin,
{
    buf.clear();
    let mut matched = 0;

    while buf.len() < limit {
        let byte = match reader.read_u8().await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(LineError::Closed { received: buf.len() });
            }
            Err(e) => return Err(LineError::Io(e)),
        };
        buf.put_u8(byte);

        if byte == EOL[matched] {
            matched += 1;
            if matched == EOL.len() {
                buf.truncate(buf.len() - EOL.len());
                return Ok(buf.len());
            }
        } else {
            matched = usize::from(byte == EOL[0]);
        }
    }

    Err(LineError::TooLong { limit })
}
