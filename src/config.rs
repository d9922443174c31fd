use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PRESENTATION_BASE: &str =
    "https://rosetta.slv.vic.gov.au/delivery/iiif/presentation/2.1";
pub const DEFAULT_OUTPUT_DIR: &str = "images";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const USER_AGENT: &str = concat!("slv-iiif/", env!("CARGO_PKG_VERSION"));

/// HTTP settings applied to every session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout (connect + body).
    pub timeout: Duration,
    /// Redirect hops followed before a request fails. `0` disables following.
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: USER_AGENT.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Manifests live at `{presentation_base}/{pid}/manifest`.
    pub presentation_base: String,
    pub output_dir: PathBuf,
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presentation_base: DEFAULT_PRESENTATION_BASE.to_owned(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            client: ClientConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup("SLV_IIIF_PRESENTATION_BASE") {
            config.presentation_base = base;
        }
        if let Some(dir) = lookup("SLV_IIIF_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("SLV_IIIF_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.client.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid SLV_IIIF_TIMEOUT_SECS"),
            }
        }
        config
    }
}
