//! AccessLogService v3 (`envoy.service.accesslog.v3`) gRPC implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

use crate::proto::als_v3::access_log_service_server::{AccessLogService, AccessLogServiceServer};
use crate::proto::als_v3::{StreamAccessLogsMessage, StreamAccessLogsResponse};
use crate::stream::{EntrySink, JsonCodec, StreamHandler};
use crate::types::ProtocolVersion;

/// Schema v3 access-log service.
#[derive(Debug, Clone)]
pub struct AccessLogServiceV3 {
    handler: StreamHandler<JsonCodec>,
}

impl AccessLogServiceV3 {
    pub fn new(sink: Arc<dyn EntrySink>) -> Self {
        Self {
            handler: StreamHandler::new(ProtocolVersion::V3, JsonCodec, sink),
        }
    }

    /// Wrap in the generated tonic server for registration on a router.
    pub fn into_server(self) -> AccessLogServiceServer<Self> {
        AccessLogServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl AccessLogService for AccessLogServiceV3 {
    async fn stream_access_logs(
        &self,
        request: Request<Streaming<StreamAccessLogsMessage>>,
    ) -> std::result::Result<Response<StreamAccessLogsResponse>, Status> {
        let peer = request.remote_addr();
        let span = tracing::info_span!("als_stream", version = "v3", peer = ?peer);

        self.handler.run(request.into_inner()).instrument(span).await?;

        Ok(Response::new(StreamAccessLogsResponse {}))
    }
}
