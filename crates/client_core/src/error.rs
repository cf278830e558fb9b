use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("could not reach the verification service: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status. `message` is the
    /// human-readable reason from the response body and may be empty.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl AuthorityError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::InvalidServerUrl { .. } | Self::Client(_) => None,
        }
    }
}
