use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.0";

/// Chunk size used when streaming file bodies.
const BUFFER_SIZE: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("connection closed while writing")]
    Closed,
    #[error("write failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("reading file body failed: {0}")]
    FileRead(#[source] std::io::Error),
    #[error("file ended after {sent} of {expected} bytes")]
    ShortFile { expected: u64, sent: u64 },
}

fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes all of `bytes`, looping over short writes.
///
/// A write that accepts zero bytes is reported as [`WriteError::Closed`].
pub async fn send_bytes<W>(stream: &mut W, bytes: &[u8]) -> Result<usize, WriteError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < bytes.len() {
        let n = stream
            .write(&bytes[written..])
            .await
            .map_err(WriteError::Io)?;

        if n == 0 {
            return Err(WriteError::Closed);
        }

        written += n;
    }
    Ok(written)
}

/// Serializes a [`Response`] onto a stream.
pub struct ResponseWriter {
    status: StatusCode,
    buffer: Vec<u8>,
    file: Option<(File, Option<u64>)>,
    written: u64,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        let mut buffer = serialize_head(&response);
        let file = match response.body {
            Body::Empty => None,
            Body::Static(bytes) => {
                buffer.extend_from_slice(bytes);
                None
            }
            Body::File { file, size } => Some((file, size)),
        };

        Self {
            status: response.status,
            buffer,
            file,
            written: 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Total bytes put on the wire so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes the header block, then the body. Returns the number of bytes
    /// written. The first failure aborts the rest of the response.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> Result<u64, WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        let n = send_bytes(stream, &self.buffer).await?;
        self.written += n as u64;

        if let Some((mut file, size)) = self.file.take() {
            self.stream_file(stream, &mut file, size).await?;
        }

        stream.flush().await.map_err(WriteError::Io)?;
        Ok(self.written)
    }

    async fn stream_file<W>(
        &mut self,
        stream: &mut W,
        file: &mut File,
        size: Option<u64>,
    ) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut chunk = vec![0u8; BUFFER_SIZE];
        let mut sent: u64 = 0;

        loop {
            let want = match size {
                Some(expected) if sent >= expected => break,
                Some(expected) => (expected - sent).min(BUFFER_SIZE as u64) as usize,
                None => BUFFER_SIZE,
            };

            let n = file
                .read(&mut chunk[..want])
                .await
                .map_err(WriteError::FileRead)?;
            if n == 0 {
                match size {
                    Some(expected) => return Err(WriteError::ShortFile { expected, sent }),
                    None => break,
                }
            }

            send_bytes(stream, &chunk[..n]).await?;
            sent += n as u64;
            self.written += n as u64;
        }

        Ok(())
    }
}
