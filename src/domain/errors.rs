use hyper::StatusCode;
use std::fmt;
use std::io;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ProxyError {
    InvalidTarget(String),
    MissingHost,
    DialFailed { target: String, reason: String },
    DialTimeout { target: String, after: Duration },
    LoopDetected { target: String },
    UnsupportedScheme(String),
    HijackUnsupported,
    Upstream(String),
    DownloadFailed(String),
    Config(String),
}

impl ProxyError {
    /// Status code sent to the proxy client when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) | ProxyError::MissingHost => StatusCode::BAD_REQUEST,
            ProxyError::HijackUnsupported => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::LoopDetected { .. } => StatusCode::LOOP_DETECTED,
            ProxyError::DialFailed { .. }
            | ProxyError::DialTimeout { .. }
            | ProxyError::UnsupportedScheme(_)
            | ProxyError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::DownloadFailed(_) | ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::InvalidTarget(msg) => write!(f, "Invalid target: {}", msg),
            ProxyError::MissingHost => write!(f, "Missing host in request"),
            ProxyError::DialFailed { target, reason } => write!(f, "dial tcp {}: {}", target, reason),
            ProxyError::DialTimeout { target, after } => {
                write!(f, "dial tcp {}: i/o timeout after {}s", target, after.as_secs_f64())
            }
            ProxyError::LoopDetected { target } => write!(f, "{} is this proxy, refusing to forward to itself", target),
            ProxyError::UnsupportedScheme(scheme) => write!(f, "unsupported protocol scheme {:?}", scheme),
            ProxyError::HijackUnsupported => write!(f, "Hijacking not supported"),
            ProxyError::Upstream(msg) => write!(f, "{}", msg),
            ProxyError::DownloadFailed(msg) => write!(f, "Download failed: {}", msg),
            ProxyError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Why the accept loop stopped.
#[derive(Debug)]
pub enum ServeError {
    /// The shutdown trigger fired; the listener was closed on purpose.
    Closed,
    Failed(io::Error),
}

impl ServeError {
    pub fn is_closed(&self) -> bool {
        matches!(self, ServeError::Closed)
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::Closed => write!(f, "server closed"),
            ServeError::Failed(e) => write!(f, "accept loop failed: {}", e),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Closed => None,
            ServeError::Failed(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    DrainTimeout { remaining: usize, after: Duration },
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownError::DrainTimeout { remaining, after } => write!(
                f,
                "{} connection(s) still open after {}s drain",
                remaining,
                after.as_secs()
            ),
        }
    }
}

impl std::error::Error for ShutdownError {}
