//! Collector server - one listener serving both ALS generations.
//!
//! Routing by protocol version is left to tonic: each generated server answers
//! on its own service path, so a v2 call can never reach the v3 handler.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use super::{AccessLogServiceV2, AccessLogServiceV3};
use crate::stream::EntrySink;
use crate::types::{Error, ProtocolVersion, Result, ServerConfig};

/// gRPC server hosting the v2 and v3 access-log services.
#[derive(Clone)]
pub struct CollectorServer {
    config: ServerConfig,
    sink: Arc<dyn EntrySink>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for CollectorServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorServer")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl CollectorServer {
    pub fn new(config: ServerConfig, sink: Arc<dyn EntrySink>) -> Self {
        Self {
            config,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Versions registered on the listener, in registration order.
    pub fn registered_versions(&self) -> &'static [ProtocolVersion] {
        &ProtocolVersion::ALL
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.listen_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| Error::ListenBind { addr, source })
    }

    /// Bind and serve until [`shutdown`](Self::shutdown) is called.
    pub async fn serve(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_with_listener(listener).await
    }

    /// Serve on an already-bound listener until shutdown.
    pub async fn serve_with_listener(&self, listener: TcpListener) -> Result<()> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!("Listening on tcp://{}", addr);
        for version in self.registered_versions() {
            tracing::info!("  ✓ {}", version.service_name());
        }

        let v2 = AccessLogServiceV2::new(self.sink.clone());
        let v3 = AccessLogServiceV3::new(self.sink.clone());

        let cancel = self.cancel.clone();
        Server::builder()
            .tcp_keepalive(self.config.tcp_keepalive)
            .http2_keepalive_interval(self.config.http2_keepalive_interval)
            .add_service(v3.into_server())
            .add_service(v2.into_server())
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                cancel.cancelled().await;
            })
            .await?;

        tracing::info!("Collector server shut down");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
