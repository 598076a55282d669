use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected http status: {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

impl ScrapeError {
    /// Network-level failures are treated as "nothing changed" by the drift
    /// poller instead of being propagated; parse failures are real errors.
    pub fn is_network(&self) -> bool {
        matches!(self, ScrapeError::Network(_) | ScrapeError::Status(_))
    }
}

impl From<quick_xml::DeError> for ScrapeError {
    fn from(err: quick_xml::DeError) -> Self {
        ScrapeError::Parse(err.to_string())
    }
}
