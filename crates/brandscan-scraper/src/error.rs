use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to inflate gzip body from {url}: {source}")]
    Decompress {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site URL \"{site}\": {reason}")]
    InvalidSiteUrl { site: String, reason: String },

    #[error("no site URL given")]
    NoSites,

    #[error("catalog has no entries")]
    EmptyCatalog,

    #[error("matcher literal \"{0}\" has no matchable characters")]
    EmptyPattern(String),

    #[error("could not compile matcher for \"{literal}\": {source}")]
    Pattern {
        literal: String,
        #[source]
        source: regex::Error,
    },
}
