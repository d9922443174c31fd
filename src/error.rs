//! Error types for each stage of the Handle → manifest → image pipeline.
//!
//! Every stage error carries the value that identifies the failing input (the
//! Handle, the item id, the page index) and keeps the underlying failure as its
//! `source`, so `{err:#}` prints the whole chain.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("open http session")]
    Session(#[source] reqwest::Error),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    ManifestFetch(#[from] ManifestFetchError),

    #[error(transparent)]
    MalformedManifest(#[from] MalformedManifestError),

    #[error(transparent)]
    ImageFetch(#[from] ImageFetchError),

    #[error("create output dir: {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write page {index}: {}", path.display())]
    WritePage {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download cancelled before page {index}")]
    Cancelled { index: usize },
}

/// The Handle did not lead to a recognizable item identifier.
#[derive(Debug, Error)]
#[error("resolve handle {handle_url}")]
pub struct ResolutionError {
    pub handle_url: String,
    #[source]
    pub cause: ResolutionCause,
}

#[derive(Debug, Error)]
pub enum ResolutionCause {
    #[error("invalid url")]
    InvalidUrl(#[source] url::ParseError),

    #[error("request failed")]
    Request(#[source] reqwest::Error),

    #[error("handle server did not redirect")]
    NotRedirected,

    #[error("no `entity=IE<digits>` in resolved url {final_url}")]
    IdentifierNotFound { final_url: String },
}

#[derive(Debug, Error)]
#[error("fetch manifest for {pid} from {url}")]
pub struct ManifestFetchError {
    pub pid: String,
    pub url: String,
    #[source]
    pub cause: ManifestFetchCause,
}

#[derive(Debug, Error)]
pub enum ManifestFetchCause {
    #[error("invalid manifest url")]
    InvalidUrl(#[source] url::ParseError),

    #[error("request failed")]
    Request(#[source] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("response body is not json")]
    Json(#[source] serde_json::Error),
}

/// The manifest lacks the sequences → canvases → images → service structure.
#[derive(Debug, Error)]
#[error("malformed manifest: expected {expected} at `{path}`")]
pub struct MalformedManifestError {
    pub path: String,
    pub expected: &'static str,
}

#[derive(Debug, Error)]
#[error("fetch image for page {index} from {url}")]
pub struct ImageFetchError {
    pub index: usize,
    pub url: String,
    #[source]
    pub cause: ImageFetchCause,
}

#[derive(Debug, Error)]
pub enum ImageFetchCause {
    #[error("invalid image url")]
    InvalidUrl(#[source] url::ParseError),

    #[error("request failed")]
    Request(#[source] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(u16),
}
