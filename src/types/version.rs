//! Protocol versions served by the collector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema generation of an access-log stream. Fixed for a session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    V2,
    V3,
}

impl ProtocolVersion {
    /// Every version registered on the listener.
    pub const ALL: [ProtocolVersion; 2] = [ProtocolVersion::V2, ProtocolVersion::V3];

    /// Fully-qualified gRPC service name the peer calls for this version.
    pub fn service_name(self) -> &'static str {
        match self {
            ProtocolVersion::V2 => "envoy.service.accesslog.v2.AccessLogService",
            ProtocolVersion::V3 => "envoy.service.accesslog.v3.AccessLogService",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::V2 => "v2",
            ProtocolVersion::V3 => "v3",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
