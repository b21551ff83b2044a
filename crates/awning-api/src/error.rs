use thiserror::Error;

/// Top-level error type for the `awning-api` crate.
///
/// Covers every failure mode across the three upstream services: transport,
/// HTTP status, and response-shape problems. `awning-core` maps these into
/// the device / weather error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, timeout, truncated body, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A field the caller depends on is absent from the response.
    #[error("Response missing required field '{field}'")]
    MissingField { field: String },
}

impl Error {
    /// Returns `true` if this is a transient transport failure worth retrying.
    ///
    /// Status codes are never transient here: a 4xx/5xx answer means the
    /// request reached the server and was rejected.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.is_body()
                    || is_truncated_body(e)
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// The HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// reqwest reports a body cut short mid-read as a decode error whose source
/// chain bottoms out in an I/O error (hyper's `IncompleteBody`).
fn is_truncated_body(err: &reqwest::Error) -> bool {
    if !err.is_decode() {
        return false;
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return true;
        }
        source = cause.source();
    }
    false
}
