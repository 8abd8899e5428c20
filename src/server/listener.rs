use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionContext};

/// Pause after a failed accept, so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound listening socket plus the settings handed to each connection.
pub struct Listener {
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
}

impl Listener {
    /// Opens the document root, then binds and listens on
    /// `cfg.listen_addr()` with `SO_REUSEADDR` set.
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let ctx = ConnectionContext::from_config(cfg)?;

        let addr = tokio::net::lookup_host(cfg.listen_addr())
            .await
            .with_context(|| format!("resolving {}", cfg.listen_addr()))?
            .next()
            .with_context(|| format!("no address for {}", cfg.listen_addr()))?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("binding {}", addr))?;
        let listener = socket
            .listen(cfg.backlog)
            .with_context(|| format!("listening on {}", addr))?;

        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per connection.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            addr = %self.local_addr()?,
            root = %self.ctx.root.path().display(),
            "Listening"
        );

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, peer, ctx);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    Listener::bind(cfg).await?.run().await
}
