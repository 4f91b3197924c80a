//! gRPC service implementations.
//!
//! Implements both generations of Envoy's access-log service:
//! - `envoy.service.accesslog.v2.AccessLogService`
//! - `envoy.service.accesslog.v3.AccessLogService`
//!
//! Both delegate to the same [`StreamHandler`](crate::stream::StreamHandler)
//! and share one listener through [`CollectorServer`].

pub mod access_log_v2;
pub mod access_log_v3;
pub mod server;

pub use access_log_v2::AccessLogServiceV2;
pub use access_log_v3::AccessLogServiceV3;
pub use server::CollectorServer;
