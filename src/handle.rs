use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{ResolutionCause, ResolutionError};
use crate::session::Session;

static ENTITY_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|&)entity=(IE\d+)").expect("entity pattern compiles"));

static ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^IE\d+$").expect("item id pattern compiles"));

/// Internal item identifier (`IE<digits>`) the presentation API is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    pub fn parse(raw: &str) -> Option<Self> {
        ITEM_ID.is_match(raw).then(|| Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Follows the Handle's redirect chain and reads the item id off the final URL.
pub fn resolve(session: &Session, handle_url: &str) -> Result<ItemId, ResolutionError> {
    let fail = |cause| ResolutionError {
        handle_url: handle_url.to_owned(),
        cause,
    };

    let url = Url::parse(handle_url).map_err(|err| fail(ResolutionCause::InvalidUrl(err)))?;
    let response = session
        .get(url.clone())
        .map_err(|err| fail(ResolutionCause::Request(err)))?;

    let final_url = response.url().clone();
    tracing::debug!(
        handle = %handle_url,
        final_url = %final_url,
        status = response.status().as_u16(),
        "handle followed"
    );

    if final_url == url {
        return Err(fail(ResolutionCause::NotRedirected));
    }

    let item_id = item_id_from_url(&final_url).ok_or_else(|| {
        fail(ResolutionCause::IdentifierNotFound {
            final_url: final_url.to_string(),
        })
    })?;

    tracing::info!(handle = %handle_url, pid = %item_id, "handle resolved");
    Ok(item_id)
}

fn item_id_from_url(url: &Url) -> Option<ItemId> {
    let query = url.query()?;
    let captures = ENTITY_PARAM.captures(query)?;
    Some(ItemId(captures.get(1)?.as_str().to_owned()))
}
