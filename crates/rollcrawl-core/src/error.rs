use std::fmt;

use thiserror::Error;

/// Which remote lookup a fetch failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStage {
    /// The by-ID lookup that resolves the owning character.
    IdLookup,
    /// The by-character lookup that returns the roll history.
    CharacterLookup,
}

impl CrawlStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlStage::IdLookup => "id lookup",
            CrawlStage::CharacterLookup => "character lookup",
        }
    }
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application-wide error types for rollcrawl.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Transport-level failure talking to the remote site.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A remote query failed during one stage of a crawl cycle.
    #[error("Fetch failed during {stage}: {message}")]
    FetchFailed { stage: CrawlStage, message: String },

    /// The target ID does not exist on the remote site yet.
    #[error("Roll with ID {0} not found")]
    NotFound(u64),

    /// A structural assumption about the remote page did not hold.
    #[error("Parse defect: {0}")]
    ParseDefect(String),

    /// The lowest missing ID did not advance after a successful cycle.
    #[error("Crawl stalled: missing ID {0} did not advance after a successful cycle")]
    Stall(u64),

    /// Writing or reading output files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output store rejected or could not parse its data.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CrawlError {
    /// Wraps a query error with the stage it happened in.
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn at_stage(self, stage: CrawlStage) -> Self {
        match self {
            CrawlError::FetchFailed { .. } => self,
            other => CrawlError::FetchFailed {
                stage,
                message: other.to_string(),
            },
        }
    }

    /// Returns true if this error should end the scheduler loop.
    ///
    /// `NotFound` means the ID is not published yet and `ParseDefect` means a
    /// single page did not match the expected template; both are retried on
    /// the next cycle. Everything else points at a systematic problem.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CrawlError::NotFound(_) | CrawlError::ParseDefect(_))
    }
}
