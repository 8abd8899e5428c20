use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::files::{DocumentRoot, ResolvedResource};
use crate::http::line::{read_line, LineError};
use crate::http::parser::{parse_request_line, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Immutable settings shared by every connection of a server.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub root: DocumentRoot,
    pub server_name: String,
    pub max_line_len: usize,
    pub read_timeout: Duration,
}

impl ConnectionContext {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            root: DocumentRoot::open(&cfg.document_root, cfg.index_file.clone())?,
            server_name: cfg.server_name.clone(),
            max_line_len: cfg.max_line_len,
            read_timeout: cfg.read_timeout(),
        })
    }
}

pub struct Connection<S> {
    stream: BufReader<S>,
    peer: SocketAddr,
    line: BytesMut,
    ctx: Arc<ConnectionContext>,
}

pub enum ConnectionState {
    Accepted,
    LineRead,
    Parsed(Request),
    Resolved(Request, ResolvedResource),
    Writing(ResponseWriter),
    Responded,
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, ctx: Arc<ConnectionContext>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer,
            line: BytesMut::with_capacity(ctx.max_line_len),
            ctx,
        }
    }

    /// Serves one request, then shuts the socket down whatever happened.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;

        if let Err(e) = self.stream.get_mut().shutdown().await {
            debug!(peer = %self.peer, error = %e, "Shutdown failed");
        }

        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        let mut state = ConnectionState::Accepted;

        loop {
            state = match state {
                ConnectionState::Accepted => self.read_request_line().await?,

                ConnectionState::LineRead => self.parse(),

                ConnectionState::Parsed(req) => {
                    let resource = self.ctx.root.resolve(&req.target).await;
                    ConnectionState::Resolved(req, resource)
                }

                ConnectionState::Resolved(req, resource) => {
                    let response = self.respond(&req, resource);
                    ConnectionState::Writing(ResponseWriter::new(response))
                }

                ConnectionState::Writing(mut writer) => {
                    let written = writer.write_to_stream(self.stream.get_mut()).await?;
                    info!(
                        peer = %self.peer,
                        status = writer.status().as_u16(),
                        bytes = written,
                        "Response sent"
                    );
                    ConnectionState::Responded
                }

                ConnectionState::Responded => ConnectionState::Closed,

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn read_request_line(&mut self) -> anyhow::Result<ConnectionState> {
        let read = read_line(&mut self.stream, &mut self.line, self.ctx.max_line_len);

        match tokio::time::timeout(self.ctx.read_timeout, read).await {
            Ok(Ok(_)) => {
                debug!(
                    peer = %self.peer,
                    request = %String::from_utf8_lossy(&self.line),
                    "Request line received"
                );
                Ok(ConnectionState::LineRead)
            }
            Ok(Err(LineError::TooLong { limit })) => {
                warn!(peer = %self.peer, limit, "Request line too long");
                Ok(self.reject())
            }
            Ok(Err(LineError::Closed { received })) => {
                debug!(peer = %self.peer, received, "Peer closed before a complete line");
                Ok(ConnectionState::Closed)
            }
            Ok(Err(LineError::Io(e))) => Err(e.into()),
            Err(_) => {
                warn!(peer = %self.peer, timeout = ?self.ctx.read_timeout, "Request line timed out");
                Ok(ConnectionState::Closed)
            }
        }
    }

    fn parse(&self) -> ConnectionState {
        match parse_request_line(&self.line) {
            Ok(req) if req.is_supported() => ConnectionState::Parsed(req),
            Ok(_) => {
                warn!(
                    peer = %self.peer,
                    request = %String::from_utf8_lossy(&self.line),
                    "Unsupported method"
                );
                self.reject()
            }
            Err(ParseError::NotHttp) => {
                warn!(
                    peer = %self.peer,
                    request = %String::from_utf8_lossy(&self.line),
                    "Not a valid HTTP request"
                );
                ConnectionState::Closed
            }
            Err(e) => {
                warn!(peer = %self.peer, error = %e, "Malformed request line");
                self.reject()
            }
        }
    }

    fn reject(&self) -> ConnectionState {
        ConnectionState::Writing(ResponseWriter::new(Response::bad_request(
            &self.ctx.server_name,
        )))
    }

    fn respond(&self, req: &Request, mut resource: ResolvedResource) -> Response {
        let server = &self.ctx.server_name;

        let Some(file) = resource.take_file() else {
            match &resource.failure {
                Some(failure) if !failure.is_not_found() => warn!(
                    peer = %self.peer,
                    method = req.method.as_str(),
                    target = %req.target,
                    path = %resource.path.display(),
                    reason = %failure,
                    status = 404,
                    "Resource unavailable"
                ),
                _ => info!(
                    peer = %self.peer,
                    method = req.method.as_str(),
                    target = %req.target,
                    path = %resource.path.display(),
                    status = 404,
                    "Not found"
                ),
            }
            return Response::not_found(server);
        };

        info!(
            peer = %self.peer,
            method = req.method.as_str(),
            target = %req.target,
            path = %resource.path.display(),
            size = ?resource.size,
            status = 200,
            "Serving resource"
        );

        if req.wants_body() {
            Response::file(server, file, resource.size)
        } else {
            Response::head(server)
        }
    }
}
