//! AccessLogService v2 (`envoy.service.accesslog.v2`) gRPC implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

use crate::proto::als_v2::access_log_service_server::{AccessLogService, AccessLogServiceServer};
use crate::proto::als_v2::{StreamAccessLogsMessage, StreamAccessLogsResponse};
use crate::stream::{EntrySink, JsonCodec, StreamHandler};
use crate::types::ProtocolVersion;

/// Schema v2 access-log service.
#[derive(Debug, Clone)]
pub struct AccessLogServiceV2 {
    handler: StreamHandler<JsonCodec>,
}

impl AccessLogServiceV2 {
    pub fn new(sink: Arc<dyn EntrySink>) -> Self {
        Self {
            handler: StreamHandler::new(ProtocolVersion::V2, JsonCodec, sink),
        }
    }

    /// Wrap in the generated tonic server for registration on a router.
    pub fn into_server(self) -> AccessLogServiceServer<Self> {
        AccessLogServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl AccessLogService for AccessLogServiceV2 {
    async fn stream_access_logs(
        &self,
        request: Request<Streaming<StreamAccessLogsMessage>>,
    ) -> std::result::Result<Response<StreamAccessLogsResponse>, Status> {
        let peer = request.remote_addr();
        let span = tracing::info_span!("als_stream", version = "v2", peer = ?peer);

        self.handler.run(request.into_inner()).instrument(span).await?;

        Ok(Response::new(StreamAccessLogsResponse {}))
    }
}
