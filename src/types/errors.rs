//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Only
//! `ListenBind` and `Config` are fatal to the process; the rest are scoped to
//! a single stream session.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the collector.
#[derive(Error, Debug)]
pub enum Error {
    /// A log entry could not be rendered to JSON. The entry is dropped and
    /// the session continues.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Reading the next frame from a stream failed. Ends that session
    /// (boxed to reduce Result size).
    #[error("stream receive error: {0}")]
    StreamReceive(Box<tonic::Status>),

    /// The listener could not be bound.
    #[error("failed to listen on {addr}: {source}")]
    ListenBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be read or parsed.
    #[error("config error ({path}): {message}")]
    Config { path: PathBuf, message: String },

    /// gRPC server transport errors.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to gRPC status code.
    ///
    /// A receive error is handed back to the peer unchanged.
    pub fn to_grpc_status(&self) -> tonic::Status {
        match self {
            Error::StreamReceive(status) => (**status).clone(),
            Error::SerializationFailed(e) => {
                tonic::Status::internal(format!("serialization failed: {}", e))
            }
            Error::ListenBind { addr, source } => {
                tonic::Status::unavailable(format!("failed to listen on {}: {}", addr, source))
            }
            Error::Config { .. } => tonic::Status::failed_precondition(self.to_string()),
            Error::Transport(e) => tonic::Status::unavailable(format!("transport error: {}", e)),
            Error::Io(e) => tonic::Status::internal(format!("io error: {}", e)),
        }
    }

    /// Whether this error ends the whole process rather than one session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ListenBind { .. } | Error::Config { .. })
    }
}

// Convenience constructors
impl Error {
    pub fn stream_receive(status: tonic::Status) -> Self {
        Self::StreamReceive(Box::new(status))
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

// Implement From<Error> for Status to enable ? operator in gRPC handlers
impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        err.to_grpc_status()
    }
}
