//! Cookie-carrying HTTP session shared by the stages of one download.
//!
//! The image server only answers requests that present the cookie set by the
//! manifest response, so the manifest GET and every image GET of a download
//! must go through the same `Session`. A session is never reused across
//! downloads.

use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Session {
    client: Client,
}

impl Session {
    /// Builds a session with an empty cookie jar and an explicit redirect policy.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let redirect = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects)
        };

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(Error::Session)?;

        tracing::debug!(
            timeout = ?config.timeout,
            max_redirects = config.max_redirects,
            "session opened"
        );
        Ok(Self { client })
    }

    pub fn get(&self, url: Url) -> reqwest::Result<Response> {
        tracing::debug!(%url, "GET");
        self.client.get(url).send()
    }

    pub fn get_json(&self, url: Url) -> reqwest::Result<Response> {
        tracing::debug!(%url, "GET (json)");
        self.client
            .get(url)
            .header(ACCEPT, "application/ld+json, application/json;q=0.9, */*;q=0.1")
            .send()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!("session closed");
    }
}
